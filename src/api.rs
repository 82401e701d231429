//! Shared frontend plumbing: configured clients and the query cache, both
//! handed to components through context.

use std::future::Future;

use chrono::Utc;
use leptos::prelude::*;
use scanton_core::cache::{QueryCache, QueryKey};
use scanton_core::config::DUCKDB_URL_OVERRIDE_KEY;
use scanton_core::{ApiConfig, ScantonClient, ScantonError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::storage::browser_store;

#[derive(Clone, Copy)]
pub struct ApiContext {
    pub config: RwSignal<ApiConfig>,
    pub cache: StoredValue<QueryCache>,
}

impl ApiContext {
    /// Build-time config plus the saved backend override, if it is valid.
    pub fn from_environment() -> Self {
        let base = ApiConfig::from_build_env();
        let saved = browser_store()
            .get(DUCKDB_URL_OVERRIDE_KEY)
            .unwrap_or_else(|e| {
                warn!("Could not read backend override: {}", e);
                None
            });
        let config = match base.clone().with_duckdb_override(saved.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring saved backend override: {}", e);
                base
            }
        };
        Self {
            config: RwSignal::new(config),
            cache: StoredValue::new(QueryCache::default()),
        }
    }

    pub fn client(&self) -> Result<ScantonClient, ScantonError> {
        ScantonClient::new(self.config.get_untracked())
    }

    /// Serve from the cache while fresh, otherwise fetch and store.
    pub async fn cached<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ScantonError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(ScantonClient) -> Fut,
        Fut: Future<Output = Result<T, ScantonError>>,
    {
        if let Some(hit) = self.cache.with_value(|c| c.get_as::<T>(&key, Utc::now())) {
            return Ok(hit);
        }
        let value = fetch(self.client()?).await?;
        self.cache.update_value(|c| {
            let now = Utc::now();
            c.clear_stale(now);
            if let Err(e) = c.put_as(key, &value, now) {
                warn!("Not caching response: {}", e);
            }
        });
        Ok(value)
    }

    pub fn invalidate(&self, keys: &[QueryKey]) {
        self.cache.update_value(|c| {
            c.invalidate(keys);
        });
    }

    pub fn invalidate_prefix(&self, prefix: &[&str]) {
        self.cache.update_value(|c| {
            c.invalidate_prefix(prefix);
        });
    }
}

pub fn use_api() -> ApiContext {
    use_context::<ApiContext>().unwrap_or_else(ApiContext::from_environment)
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Fresh seed for the sampling shuffle.
pub fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}
