use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ScantonClient;
use crate::error::ScantonError;
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShardStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShardProgress {
    pub shard_index: u32,
    pub status: ShardStatus,
    pub progress_percent: f64,
    pub processed_events: u64,
    pub total_events: Option<u64>,
    pub eta: Option<String>,
    pub updated_at: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ShardListing {
    shards: Vec<ShardProgress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackfillStatus {
    pub running: bool,
    pub phase: Option<String>,
    pub started_at: Option<String>,
    pub total_updates: u64,
    pub processed_updates: u64,
    pub progress_percent: f64,
    pub eta: Option<String>,
    pub errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gap {
    pub synchronizer_id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GapReport {
    pub gaps: Vec<Gap>,
    pub total_gaps: u32,
    pub total_missing_seconds: f64,
    pub checked_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineStatus {
    pub running: bool,
    pub version: Option<String>,
    pub last_processed_at: Option<String>,
    pub queue_depth: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcsSnapshot {
    pub id: String,
    pub record_time: String,
    pub migration_id: Option<u64>,
    pub contract_count: u64,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AcsListing {
    snapshots: Vec<AcsSnapshot>,
}

/// Options for a streamed gap recovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gaps: Option<u32>,
    pub dry_run: bool,
}

impl<T: Transport> ScantonClient<T> {
    pub async fn shard_progress(&self) -> Result<Vec<ShardProgress>, ScantonError> {
        let listing: ShardListing = self
            .get_json(self.config().duckdb("/api/backfill/shards"))
            .await?;
        Ok(listing.shards)
    }

    pub async fn backfill_status(&self) -> Result<BackfillStatus, ScantonError> {
        self.get_json(self.config().duckdb("/api/backfill/status"))
            .await
    }

    pub async fn gap_report(&self) -> Result<GapReport, ScantonError> {
        self.get_json(self.config().duckdb("/api/backfill/gaps"))
            .await
    }

    pub async fn detect_gaps(&self) -> Result<GapReport, ScantonError> {
        self.post_json(self.config().duckdb("/api/backfill/gaps/detect"), json!({}))
            .await
    }

    pub async fn engine_status(&self) -> Result<EngineStatus, ScantonError> {
        self.get_json(self.config().duckdb("/api/engine/status"))
            .await
    }

    pub async fn acs_snapshots(&self) -> Result<Vec<AcsSnapshot>, ScantonError> {
        let listing: AcsListing = self
            .get_json(self.config().duckdb("/api/acs/snapshots"))
            .await?;
        Ok(listing.snapshots)
    }

    /// Start a recovery run and feed raw body chunks to `on_chunk`.
    pub async fn recover_gaps(
        &self,
        request: &RecoveryRequest,
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8])),
    ) -> Result<(), ScantonError> {
        let body = serde_json::to_value(request)?;
        self.transport()
            .stream(
                ApiRequest::post(self.config().duckdb("/api/backfill/gaps/recover"), body),
                on_chunk,
            )
            .await
    }
}
