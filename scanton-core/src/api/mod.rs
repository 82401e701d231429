//! Typed endpoint clients.
//!
//! One `ScantonClient` carries the configured base URLs and a transport; the
//! submodules add `impl` blocks grouped by backend area.

pub mod backfill;
pub mod governance;
pub mod market;
pub mod scan;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::ScantonError;
use crate::transport::{ApiRequest, HttpTransport, Transport};

pub struct ScantonClient<T: Transport = HttpTransport> {
    config: ApiConfig,
    transport: T,
}

impl ScantonClient<HttpTransport> {
    pub fn new(config: ApiConfig) -> Result<Self, ScantonError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> ScantonClient<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, url: String) -> Result<R, ScantonError> {
        let value = self.transport.send(ApiRequest::get(url)).await?;
        decode(value)
    }

    pub(crate) async fn post_json<R: DeserializeOwned>(
        &self,
        url: String,
        body: Value,
    ) -> Result<R, ScantonError> {
        let value = self.transport.send(ApiRequest::post(url, body)).await?;
        decode(value)
    }

    pub(crate) async fn delete(&self, url: String, body: Option<Value>) -> Result<Value, ScantonError> {
        self.transport.send(ApiRequest::delete(url, body)).await
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ScantonError> {
    serde_json::from_value(value).map_err(ScantonError::from)
}
