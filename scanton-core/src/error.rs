use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScantonError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Operation aborted")]
    Aborted,
}

impl From<ScantonError> for String {
    fn from(err: ScantonError) -> Self {
        err.to_string()
    }
}

impl From<serde_json::Error> for ScantonError {
    fn from(err: serde_json::Error) -> Self {
        ScantonError::Decode(err.to_string())
    }
}
