use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScantonError;

pub const DEFAULT_DUCKDB_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_SCAN_API_URL: &str =
    "https://scan.sv-1.global.canton.network.sync.global/api/scan";
pub const DEFAULT_MARKET_API_URL: &str = "http://localhost:3001/api/market";

/// localStorage key holding a user override of the local backend URL.
pub const DUCKDB_URL_OVERRIDE_KEY: &str = "scanton-duckdb-api-url";

/// Base URLs for every backend the dashboard talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub duckdb_api_url: String,
    pub scan_api_url: String,
    pub market_api_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            duckdb_api_url: DEFAULT_DUCKDB_API_URL.to_string(),
            scan_api_url: DEFAULT_SCAN_API_URL.to_string(),
            market_api_url: DEFAULT_MARKET_API_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Build from variables baked in at compile time. The browser has no
    /// process environment, so `option_env!` is the only source here.
    pub fn from_build_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = option_env!("SCANTON_DUCKDB_API_URL") {
            config.duckdb_api_url = url.to_string();
        }
        if let Some(url) = option_env!("SCANTON_SCAN_API_URL") {
            config.scan_api_url = url.to_string();
        }
        if let Some(url) = option_env!("SCANTON_MARKET_API_URL") {
            config.market_api_url = url.to_string();
        }
        config.normalized()
    }

    /// Apply a runtime override of the local backend URL.
    /// Blank overrides are ignored; invalid ones are rejected.
    pub fn with_duckdb_override(mut self, value: Option<&str>) -> Result<Self, ScantonError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => {
                validate_base_url(url)?;
                self.duckdb_api_url = url.to_string();
                Ok(self.normalized())
            }
            None => Ok(self),
        }
    }

    pub fn validate(&self) -> Result<(), ScantonError> {
        validate_base_url(&self.duckdb_api_url)?;
        validate_base_url(&self.scan_api_url)?;
        validate_base_url(&self.market_api_url)
    }

    pub fn duckdb(&self, path: &str) -> String {
        join(&self.duckdb_api_url, path)
    }

    pub fn scan(&self, path: &str) -> String {
        join(&self.scan_api_url, path)
    }

    pub fn market(&self, path: &str) -> String {
        join(&self.market_api_url, path)
    }

    fn normalized(mut self) -> Self {
        for url in [
            &mut self.duckdb_api_url,
            &mut self.scan_api_url,
            &mut self.market_api_url,
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_string();
            *url = trimmed;
        }
        self
    }
}

pub fn validate_base_url(value: &str) -> Result<(), ScantonError> {
    let parsed = Url::parse(value.trim())
        .map_err(|e| ScantonError::Config(format!("Invalid URL '{}': {}", value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScantonError::Config(format!(
            "Unsupported scheme '{}' in '{}'",
            other, value
        ))),
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_handles_slashes() {
        let config = ApiConfig {
            duckdb_api_url: "http://localhost:3001/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            config.duckdb("/api/backfill/shards"),
            "http://localhost:3001/api/backfill/shards"
        );
        assert_eq!(
            config.duckdb("api/engine/status"),
            "http://localhost:3001/api/engine/status"
        );
    }

    #[test]
    fn test_override_replaces_backend_url() {
        let config = ApiConfig::default()
            .with_duckdb_override(Some("https://duck.example.org/"))
            .unwrap();
        assert_eq!(config.duckdb_api_url, "https://duck.example.org");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = ApiConfig::default().with_duckdb_override(Some("   ")).unwrap();
        assert_eq!(config.duckdb_api_url, DEFAULT_DUCKDB_API_URL);
        let config = ApiConfig::default().with_duckdb_override(None).unwrap();
        assert_eq!(config.duckdb_api_url, DEFAULT_DUCKDB_API_URL);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = ApiConfig::default()
            .with_duckdb_override(Some("ftp://nope"))
            .unwrap_err();
        assert!(matches!(err, ScantonError::Config(_)));
        assert!(ApiConfig::default()
            .with_duckdb_override(Some("not a url"))
            .is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(ApiConfig::default().validate().is_ok());
        assert!(ApiConfig::from_build_env().validate().is_ok());
    }
}
