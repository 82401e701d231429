use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::ScantonClient;
use crate::error::ScantonError;
use crate::lifecycle::{LifecycleStage, StageInference};
use crate::transport::Transport;
use crate::types::{
    EvaluationResult, GoldenItem, GoldenItemDraft, GoldenSetSummary, GovernanceItem,
    LearnedPatterns, ProposedImprovement,
};

const LIFECYCLE: &str = "/api/governance-lifecycle";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GoldenSetListing {
    items: Vec<GoldenItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EvaluationHistory {
    evaluations: Vec<EvaluationResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GovernanceListing {
    items: Vec<GovernanceItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ImprovementSuggestions {
    improvements: Vec<ProposedImprovement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PatternDryRun {
    proposed_changes: Vec<ProposedImprovement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyResult {
    pub success: bool,
    pub version: Option<String>,
    pub applied: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningStatus {
    pub learning_mode: bool,
    pub corrections_count: u32,
    pub pending_corrections: u32,
}

impl<T: Transport> ScantonClient<T> {
    fn lifecycle(&self, path: &str) -> String {
        self.config().duckdb(&format!("{}{}", LIFECYCLE, path))
    }

    pub async fn golden_set_summary(&self) -> Result<GoldenSetSummary, ScantonError> {
        self.get_json(self.lifecycle("/golden-set/summary")).await
    }

    pub async fn golden_set(&self) -> Result<Vec<GoldenItem>, ScantonError> {
        let listing: GoldenSetListing = self.get_json(self.lifecycle("/golden-set")).await?;
        Ok(listing.items)
    }

    pub async fn evaluation_history(&self) -> Result<Vec<EvaluationResult>, ScantonError> {
        let history: EvaluationHistory =
            self.get_json(self.lifecycle("/golden-set/evaluations")).await?;
        Ok(history.evaluations)
    }

    pub async fn add_golden_item(&self, draft: &GoldenItemDraft) -> Result<(), ScantonError> {
        let body = serde_json::to_value(draft)?;
        let _: Value = self.post_json(self.lifecycle("/golden-set/items"), body).await?;
        info!("Added golden item {}", draft.id);
        Ok(())
    }

    pub async fn remove_golden_item(&self, id: &str, reason: &str) -> Result<(), ScantonError> {
        let url = self.lifecycle(&format!(
            "/golden-set/items/{}",
            urlencoding::encode(id)
        ));
        self.delete(url, Some(json!({ "reason": reason }))).await?;
        info!("Removed golden item {}", id);
        Ok(())
    }

    pub async fn evaluate_golden_set(
        &self,
        classifier_version: &str,
    ) -> Result<EvaluationResult, ScantonError> {
        self.post_json(
            self.lifecycle("/golden-set/evaluate"),
            json!({ "classifierVersion": classifier_version }),
        )
        .await
    }

    pub async fn governance_items(&self, limit: usize) -> Result<Vec<GovernanceItem>, ScantonError> {
        let listing: GovernanceListing = self
            .get_json(self.lifecycle(&format!("/items?limit={}", limit)))
            .await?;
        Ok(listing.items)
    }

    pub async fn improvement_suggestions(&self) -> Result<Vec<ProposedImprovement>, ScantonError> {
        let suggestions: ImprovementSuggestions =
            self.get_json(self.lifecycle("/learning/improvements")).await?;
        Ok(suggestions.improvements)
    }

    pub async fn dry_run_patterns(&self) -> Result<Vec<ProposedImprovement>, ScantonError> {
        let dry_run: PatternDryRun = self
            .post_json(
                self.lifecycle("/learning/generate-patterns"),
                json!({ "dryRun": true }),
            )
            .await?;
        Ok(dry_run.proposed_changes)
    }

    pub async fn apply_proposals(&self, proposal_ids: &[String]) -> Result<ApplyResult, ScantonError> {
        self.post_json(
            self.lifecycle("/learning/apply"),
            json!({ "proposalIds": proposal_ids, "dryRun": false }),
        )
        .await
    }

    pub async fn learning_status(&self) -> Result<LearningStatus, ScantonError> {
        self.get_json(self.lifecycle("/learning/status")).await
    }

    pub async fn toggle_learning_mode(&self) -> Result<LearningStatus, ScantonError> {
        self.post_json(self.lifecycle("/learning/toggle"), json!({})).await
    }

    pub async fn learned_patterns(&self) -> Result<LearnedPatterns, ScantonError> {
        self.get_json(self.lifecycle("/learning/patterns")).await
    }

    /// Ask the stage classifier to label free text. Blank input never leaves
    /// the client.
    pub async fn infer_stage(&self, text: &str) -> Result<StageInference, ScantonError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(StageInference {
                stage: LifecycleStage::Other,
                confidence: 0.0,
            });
        }
        self.post_json(self.lifecycle("/infer-stage"), json!({ "text": text }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::transport::mock::{MockTransport, Reply};
    use crate::transport::Method;

    #[tokio::test]
    async fn test_blank_text_is_other_without_a_request() {
        let client = ScantonClient::with_transport(ApiConfig::default(), MockTransport::new());
        for text in ["", "   ", "\n\t"] {
            let inference = client.infer_stage(text).await.unwrap();
            assert_eq!(inference.stage, LifecycleStage::Other);
            assert_eq!(inference.confidence, 0.0);
        }
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_text_is_posted_trimmed() {
        let transport = MockTransport::new().on(
            Method::Post,
            "/infer-stage",
            Reply::Json(json!({"stage": "cip-vote", "confidence": 0.82})),
        );
        let client = ScantonClient::with_transport(ApiConfig::default(), transport);
        let inference = client.infer_stage("  Vote on CIP-0042  ").await.unwrap();
        assert_eq!(inference.stage, LifecycleStage::CipVote);

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({"text": "Vote on CIP-0042"})));
    }
}
