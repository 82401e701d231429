use scanton_core::alerts::{KeyValueStore, MemoryStore};
use scanton_core::ScantonError;
use tracing::warn;

/// `window.localStorage` behind the core's store trait.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScantonError> {
        self.storage
            .get_item(key)
            .map_err(|e| ScantonError::Storage(format!("Failed to read '{}': {:?}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ScantonError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| ScantonError::Storage(format!("Failed to write '{}': {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<(), ScantonError> {
        self.storage
            .remove_item(key)
            .map_err(|e| ScantonError::Storage(format!("Failed to remove '{}': {:?}", key, e)))
    }
}

/// localStorage when the browser allows it, otherwise an in-memory store
/// (private browsing, storage disabled).
pub fn browser_store() -> Box<dyn KeyValueStore> {
    match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        Some(storage) => Box::new(LocalStore { storage }),
        None => {
            warn!("localStorage unavailable, settings will not persist");
            Box::new(MemoryStore::default())
        }
    }
}
