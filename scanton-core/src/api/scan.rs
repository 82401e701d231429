use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ScantonClient;
use crate::error::ScantonError;
use crate::supply::RoundTotals;
use crate::transport::Transport;
use crate::votes::{normalize_vote_result, VoteOutcome};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RoundTotalsResponse {
    entries: Vec<RoundTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatestRound {
    pub round: u64,
    #[serde(rename = "effectiveAt")]
    pub effective_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct VoteResultsResponse {
    dso_rules_vote_results: Vec<Value>,
}

/// The subset of `/v0/dso` the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DsoInfo {
    pub sv_party_id: String,
    pub dso_party_id: String,
    pub voting_threshold: u32,
    pub sv_node_states: Vec<Value>,
}

impl DsoInfo {
    pub fn sv_count(&self) -> usize {
        self.sv_node_states.len()
    }
}

impl<T: Transport> ScantonClient<T> {
    pub async fn round_totals(
        &self,
        start_round: u64,
        end_round: u64,
    ) -> Result<Vec<RoundTotals>, ScantonError> {
        let response: RoundTotalsResponse = self
            .post_json(
                self.config().scan("/v0/round-totals"),
                json!({ "start_round": start_round, "end_round": end_round }),
            )
            .await?;
        Ok(response.entries)
    }

    pub async fn latest_round(&self) -> Result<LatestRound, ScantonError> {
        self.get_json(self.config().scan("/v0/round-of-latest-data"))
            .await
    }

    pub async fn vote_results(&self, limit: u32) -> Result<Vec<VoteOutcome>, ScantonError> {
        let response: VoteResultsResponse = self
            .post_json(
                self.config().scan("/v0/admin/sv/voteresults"),
                json!({ "limit": limit }),
            )
            .await?;
        Ok(response
            .dso_rules_vote_results
            .iter()
            .map(normalize_vote_result)
            .collect())
    }

    pub async fn dso_info(&self) -> Result<DsoInfo, ScantonError> {
        self.get_json(self.config().scan("/v0/dso")).await
    }
}
