//! Ledger and market APIs send decimals as strings to avoid float loss.
//! The dashboard only displays them, so they are read into `f64`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Null,
}

pub fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => Ok(n),
        RawAmount::Text(s) => Ok(s.trim().parse().unwrap_or(0.0)),
        RawAmount::Null => Ok(0.0),
    }
}

/// Compact human format: 1234567 -> "1.23M".
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        return format!("{:.2}", value);
    };
    format!("{:.2}{}", scaled, suffix)
}
