use serde::{Deserialize, Serialize};

use super::ScantonClient;
use crate::amount::de_amount;
use crate::error::ScantonError;
use crate::transport::Transport;

/// One OHLCV bar. Prices arrive as decimal strings from the proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candle {
    pub timestamp: i64,
    #[serde(deserialize_with = "de_amount")]
    pub open: f64,
    #[serde(deserialize_with = "de_amount")]
    pub high: f64,
    #[serde(deserialize_with = "de_amount")]
    pub low: f64,
    #[serde(deserialize_with = "de_amount")]
    pub close: f64,
    #[serde(deserialize_with = "de_amount")]
    pub volume: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CandleResponse {
    data: Vec<Candle>,
}

/// Price change between the oldest and newest bar, in percent.
pub fn change_percent(candles: &[Candle]) -> Option<f64> {
    let first = candles.first()?;
    let last = candles.last()?;
    if first.open == 0.0 {
        return None;
    }
    Some((last.close - first.open) / first.open * 100.0)
}

impl<T: Transport> ScantonClient<T> {
    /// Candles oldest-first. Bars with no trades (zero close) are dropped.
    pub async fn candles(
        &self,
        instrument: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, ScantonError> {
        let url = self.config().market(&format!(
            "/candles?instrument={}&interval={}&page_size={}",
            urlencoding::encode(instrument),
            urlencoding::encode(interval),
            limit
        ));
        let response: CandleResponse = self.get_json(url).await?;
        let mut candles: Vec<Candle> = response
            .data
            .into_iter()
            .filter(|c| c.close > 0.0)
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::transport::mock::{MockTransport, Reply};
    use crate::transport::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_candles_sorted_and_empty_bars_dropped() {
        let transport = MockTransport::new().on(
            Method::Get,
            "/candles",
            Reply::Json(json!({"data": [
                {"timestamp": 3000, "open": "0.16", "high": "0.17", "low": "0.15", "close": "0.165", "volume": "1200"},
                {"timestamp": 1000, "open": "0.15", "high": "0.16", "low": "0.14", "close": "0.155", "volume": "900"},
                {"timestamp": 2000, "open": null, "high": null, "low": null, "close": null, "volume": "0"}
            ]})),
        );
        let client = ScantonClient::with_transport(ApiConfig::default(), transport);
        let candles = client.candles("cc-usdt", "1h", 24).await.unwrap();
        assert_eq!(
            candles.iter().map(|c| c.timestamp).collect::<Vec<_>>(),
            vec![1000, 3000]
        );
        assert!(client.transport().calls()[0].url.contains("instrument=cc-usdt"));

        let change = change_percent(&candles).unwrap();
        assert!((change - 10.0).abs() < 1e-9);
    }
}
