pub mod alerts;
pub mod amount;
pub mod api;
pub mod boundary;
pub mod cache;
pub mod config;
pub mod error;
pub mod issuance;
pub mod lifecycle;
pub mod pagination;
pub mod shards;
pub mod stream;
pub mod supply;
pub mod task;
pub mod transport;
pub mod types;
pub mod votes;
pub mod workflow;

pub use api::ScantonClient;
pub use config::ApiConfig;
pub use error::ScantonError;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
