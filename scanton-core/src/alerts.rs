//! Local price alerts, persisted as a JSON array under [`PRICE_ALERTS_KEY`].

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ScantonError;

pub const PRICE_ALERTS_KEY: &str = "cc-price-alerts";

/// String key/value persistence. The browser implementation wraps
/// `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScantonError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ScantonError>;
    fn remove(&self, key: &str) -> Result<(), ScantonError>;
}

/// Process-local store, used when `localStorage` is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ScantonError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ScantonError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ScantonError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl AlertDirection {
    pub fn label(&self) -> &'static str {
        match self {
            AlertDirection::Above => "above",
            AlertDirection::Below => "below",
        }
    }

    fn is_crossed(&self, target: f64, price: f64) -> bool {
        match self {
            AlertDirection::Above => price >= target,
            AlertDirection::Below => price <= target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub target_price: f64,
    pub direction: AlertDirection,
    pub created_at: i64,
    #[serde(default)]
    pub triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceAlerts {
    alerts: Vec<PriceAlert>,
}

impl PriceAlerts {
    /// Read saved alerts. Missing or corrupt data yields an empty book.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(PRICE_ALERTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!("Failed to read price alerts: {}", e);
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<PriceAlert>>(&raw) {
            Ok(alerts) => Self { alerts },
            Err(e) => {
                warn!("Ignoring malformed price alerts: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), ScantonError> {
        let json = serde_json::to_string(&self.alerts)
            .map_err(|e| ScantonError::Storage(format!("Failed to serialize alerts: {}", e)))?;
        store.set(PRICE_ALERTS_KEY, &json)
    }

    pub fn alerts(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn active(&self) -> impl Iterator<Item = &PriceAlert> {
        self.alerts.iter().filter(|a| !a.triggered)
    }

    pub fn add(
        &mut self,
        target_price: f64,
        direction: AlertDirection,
        now_ms: i64,
    ) -> Result<&PriceAlert, ScantonError> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(ScantonError::Validation(
                "Target price must be a positive number".to_string(),
            ));
        }
        let mut id = format!("alert-{}", now_ms);
        let mut n = 1;
        while self.alerts.iter().any(|a| a.id == id) {
            id = format!("alert-{}-{}", now_ms, n);
            n += 1;
        }
        info!("Added price alert {} ({} {})", id, direction.label(), target_price);
        self.alerts.push(PriceAlert {
            id,
            target_price,
            direction,
            created_at: now_ms,
            triggered: false,
            triggered_at: None,
        });
        Ok(&self.alerts[self.alerts.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Mark every untriggered alert crossed by `price`. Each alert fires at
    /// most once; the newly fired ones are returned.
    pub fn evaluate(&mut self, price: f64, now_ms: i64) -> Vec<PriceAlert> {
        if !price.is_finite() || price <= 0.0 {
            return Vec::new();
        }
        let mut fired = Vec::new();
        for alert in self.alerts.iter_mut().filter(|a| !a.triggered) {
            if alert.direction.is_crossed(alert.target_price, price) {
                alert.triggered = true;
                alert.triggered_at = Some(now_ms);
                info!("Price alert {} fired at {}", alert.id, price);
                fired.push(alert.clone());
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_persist_under_fixed_key() {
        let store = MemoryStore::default();
        let mut book = PriceAlerts::load(&store);
        book.add(0.25, AlertDirection::Above, 1_000).unwrap();
        book.add(0.10, AlertDirection::Below, 2_000).unwrap();
        book.save(&store).unwrap();

        let raw = store.get(PRICE_ALERTS_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed[0]["targetPrice"], 0.25);
        assert_eq!(parsed[1]["direction"], "below");

        let reloaded = PriceAlerts::load(&store);
        assert_eq!(reloaded, book);
    }

    #[test]
    fn test_alert_triggers_once() {
        let mut book = PriceAlerts::default();
        book.add(0.20, AlertDirection::Above, 1).unwrap();
        book.add(0.12, AlertDirection::Below, 2).unwrap();

        assert!(book.evaluate(0.15, 10).is_empty());
        let fired = book.evaluate(0.21, 11);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].direction, AlertDirection::Above);
        assert_eq!(fired[0].triggered_at, Some(11));
        assert!(book.evaluate(0.30, 12).is_empty());
        assert_eq!(book.active().count(), 1);
    }

    #[test]
    fn test_invalid_target_rejected() {
        let mut book = PriceAlerts::default();
        assert!(book.add(0.0, AlertDirection::Above, 1).is_err());
        assert!(book.add(f64::NAN, AlertDirection::Below, 1).is_err());
        assert!(book.alerts().is_empty());
    }

    #[test]
    fn test_ids_unique_and_remove() {
        let mut book = PriceAlerts::default();
        let a = book.add(1.0, AlertDirection::Above, 5).unwrap().id.clone();
        let b = book.add(2.0, AlertDirection::Above, 5).unwrap().id.clone();
        assert_ne!(a, b);
        assert!(book.remove(&a));
        assert!(!book.remove(&a));
        assert_eq!(book.alerts().len(), 1);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let store = MemoryStore::default();
        store.set(PRICE_ALERTS_KEY, "{not json").unwrap();
        assert!(PriceAlerts::load(&store).alerts().is_empty());
    }
}
