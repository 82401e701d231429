use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ScantonError;

/// Cache key made of string segments, e.g. `["governance", "golden-set"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(segments.into_iter().map(|s| normalize_segment(s.as_ref())).collect())
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.0.len() >= prefix.len()
            && self.0.iter().zip(prefix).all(|(a, b)| *a == normalize_segment(b))
    }
}

impl<const N: usize> From<[&str; N]> for QueryKey {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

/// Trim and collapse inner whitespace. Case is kept since ids are
/// case-sensitive.
fn normalize_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: DateTime<Utc>,
    stale_after: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at < self.stale_after
    }
}

/// In-memory response cache with per-entry staleness windows. Time is passed
/// in by the caller so behaviour is deterministic under test.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    default_stale_after: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::seconds(30))
    }
}

impl QueryCache {
    pub fn new(default_stale_after: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_stale_after,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh value only. Stale entries are never served.
    pub fn get(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<&Value> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh(now) {
            debug!("Cache hit for {:?}", key);
            Some(&entry.value)
        } else {
            None
        }
    }

    /// Typed lookup. A cached value that no longer decodes is treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<T> {
        self.get(key, now)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn put(&mut self, key: QueryKey, value: Value, now: DateTime<Utc>) {
        let stale_after = self.default_stale_after;
        self.put_with_window(key, value, now, stale_after);
    }

    fn put_with_window(
        &mut self,
        key: QueryKey,
        value: Value,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                stale_after,
            },
        );
    }

    pub fn put_as<T: Serialize>(
        &mut self,
        key: QueryKey,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), ScantonError> {
        let value = serde_json::to_value(value)?;
        self.put(key, value, now);
        Ok(())
    }

    /// Drop every key beginning with `prefix`. Returns the number removed.
    pub fn invalidate_prefix(&mut self, prefix: &[&str]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();
        if removed > 0 {
            info!("Invalidated {} cache entries under {:?}", removed, prefix);
        }
        removed
    }

    /// Drop exactly the listed keys.
    pub fn invalidate(&mut self, keys: &[QueryKey]) -> usize {
        keys.iter()
            .filter(|key| self.entries.remove(*key).is_some())
            .count()
    }

    /// Delete all stale entries. Returns the number removed.
    pub fn clear_stale(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
