//! Review board for improvement proposals learned from manual corrections.
//!
//! Decisions are client-only bookkeeping. They are keyed to the batch that
//! was generated last and are dropped together with it, either on the next
//! generation or once the accepted set has been applied.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::governance::{ApplyResult, LearningStatus};
use crate::api::ScantonClient;
use crate::error::ScantonError;
use crate::transport::Transport;
use crate::types::{
    Decision, LearnedPatterns, Priority, ProposalDecision, ProposalScope, ProposedImprovement,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionCounts {
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalBoard {
    proposals: Vec<ProposedImprovement>,
    decisions: HashMap<String, ProposalDecision>,
    pub learning_mode: Option<bool>,
    pub corrections_count: u32,
    pub patterns: Option<LearnedPatterns>,
    pub last_applied: Option<ApplyResult>,
}

impl ProposalBoard {
    pub fn proposals(&self) -> &[ProposedImprovement] {
        &self.proposals
    }

    pub fn decision(&self, id: &str) -> Decision {
        self.decisions
            .get(id)
            .map(|d| d.decision)
            .unwrap_or_default()
    }

    pub fn decided_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.decisions.get(id).and_then(|d| d.decided_at)
    }

    pub fn counts(&self) -> DecisionCounts {
        let mut counts = DecisionCounts::default();
        for p in &self.proposals {
            match self.decision(&p.id) {
                Decision::Accept => counts.accepted += 1,
                Decision::Reject => counts.rejected += 1,
                Decision::Pending => counts.pending += 1,
            }
        }
        counts
    }

    /// Accepted proposal ids in display order.
    pub fn accepted_ids(&self) -> Vec<String> {
        self.proposals
            .iter()
            .filter(|p| self.decision(&p.id) == Decision::Accept)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Replace the batch. Every decision from the previous batch is dropped.
    pub fn load_batch(&mut self, proposals: Vec<ProposedImprovement>) {
        self.decisions = proposals
            .iter()
            .map(|p| {
                (
                    p.id.clone(),
                    ProposalDecision {
                        proposal_id: p.id.clone(),
                        decision: Decision::Pending,
                        decided_at: None,
                    },
                )
            })
            .collect();
        self.proposals = proposals;
    }

    /// Pull suggestions, then a dry-run pattern generation, and merge them
    /// into a batch with ids unique to this generation. The board itself is
    /// left alone so the caller can load the batch into the current state.
    pub async fn fetch_batch<T: Transport>(
        client: &ScantonClient<T>,
        now_ms: i64,
    ) -> Result<Vec<ProposedImprovement>, ScantonError> {
        let suggestions = client.improvement_suggestions().await?;
        let dry_run = client.dry_run_patterns().await?;

        let batch: Vec<ProposedImprovement> = suggestions
            .into_iter()
            .chain(dry_run)
            .enumerate()
            .map(|(i, mut p)| {
                p.id = format!("prop-{}-{}", i, now_ms);
                p
            })
            .collect();

        info!("Generated {} proposals", batch.len());
        Ok(batch)
    }

    pub async fn generate_proposals<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        now_ms: i64,
    ) -> Result<usize, ScantonError> {
        let batch = Self::fetch_batch(client, now_ms).await?;
        self.load_batch(batch);
        Ok(self.proposals.len())
    }

    /// Record a decision. Unknown ids are ignored and return `false`.
    pub fn decide(&mut self, id: &str, decision: Decision, now: DateTime<Utc>) -> bool {
        match self.decisions.get_mut(id) {
            Some(entry) => {
                entry.decision = decision;
                entry.decided_at = match decision {
                    Decision::Pending => None,
                    _ => Some(now),
                };
                true
            }
            None => false,
        }
    }

    fn accept_where(
        &mut self,
        now: DateTime<Utc>,
        predicate: impl Fn(&ProposedImprovement) -> bool,
    ) -> usize {
        let ids: Vec<String> = self
            .proposals
            .iter()
            .filter(|p| predicate(*p))
            .map(|p| p.id.clone())
            .collect();
        for id in &ids {
            self.decide(id, Decision::Accept, now);
        }
        ids.len()
    }

    pub fn accept_all_high_priority(&mut self, now: DateTime<Utc>) -> usize {
        self.accept_where(now, |p| p.priority == Priority::High)
    }

    pub fn accept_all_general(&mut self, now: DateTime<Utc>) -> usize {
        self.accept_where(now, |p| p.scope == Some(ProposalScope::General))
    }

    /// Ids to send for persistence. Refuses when nothing is accepted.
    pub fn ids_to_apply(&self) -> Result<Vec<String>, ScantonError> {
        let ids = self.accepted_ids();
        if ids.is_empty() {
            return Err(ScantonError::Validation(
                "No proposals accepted. Accept at least one before applying.".to_string(),
            ));
        }
        Ok(ids)
    }

    /// Discard the whole batch and its decisions after a successful apply.
    pub fn record_applied(&mut self, result: ApplyResult) {
        self.proposals.clear();
        self.decisions.clear();
        self.last_applied = Some(result);
    }

    /// Send the accepted ids for persistence as a new pattern version. Nothing
    /// goes over the network when nothing is accepted.
    pub async fn apply_accepted<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
    ) -> Result<ApplyResult, ScantonError> {
        let ids = self.ids_to_apply()?;
        let result = client.apply_proposals(&ids).await?;
        info!(
            "Applied {} proposals, pattern version {}",
            ids.len(),
            result.version.as_deref().unwrap_or("unknown")
        );
        self.record_applied(result.clone());
        Ok(result)
    }

    pub fn set_status(&mut self, status: &LearningStatus) {
        self.learning_mode = Some(status.learning_mode);
        self.corrections_count = status.corrections_count;
    }

    /// After a toggle the local flag mirrors whatever the backend reports.
    pub fn set_learning_mode(&mut self, status: &LearningStatus) -> bool {
        self.learning_mode = Some(status.learning_mode);
        status.learning_mode
    }

    pub fn set_patterns(&mut self, patterns: LearnedPatterns) {
        self.patterns = Some(patterns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::transport::mock::{MockTransport, Reply};
    use crate::transport::Method;
    use serde_json::json;

    fn client(transport: MockTransport) -> ScantonClient<MockTransport> {
        ScantonClient::with_transport(ApiConfig::default(), transport)
    }

    fn generating() -> MockTransport {
        MockTransport::new()
            .on(
                Method::Get,
                "/learning/improvements",
                Reply::Json(json!({"improvements": [
                    {"type": "keyword", "priority": "high", "description": "Add 'featured app'", "reason": "3 corrections", "scope": "general"},
                    {"type": "keyword", "priority": "low", "description": "Add 'onboard'", "reason": "1 correction", "scope": "entity"},
                    {"type": "prompt", "priority": "high", "description": "Clarify outcome", "reason": "2 corrections"}
                ]})),
            )
            .on(
                Method::Post,
                "/learning/generate-patterns",
                Reply::Json(json!({"proposedChanges": [
                    {"type": "entity", "priority": "medium", "description": "Map DA", "reason": "dry run", "scope": "general"}
                ]})),
            )
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[tokio::test]
    async fn test_generate_assigns_batch_ids_and_pending() {
        let c = client(generating());
        let mut board = ProposalBoard::default();
        assert_eq!(board.generate_proposals(&c, 1700).await.unwrap(), 4);

        let ids: Vec<&str> = board.proposals().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["prop-0-1700", "prop-1-1700", "prop-2-1700", "prop-3-1700"]);
        assert!(board
            .proposals()
            .iter()
            .all(|p| board.decision(&p.id) == Decision::Pending));
        assert_eq!(c.transport().calls()[1].body, Some(json!({"dryRun": true})));
    }

    #[tokio::test]
    async fn test_regenerate_discards_previous_decisions() {
        let c = client(generating());
        let mut board = ProposalBoard::default();
        board.generate_proposals(&c, 1).await.unwrap();
        assert!(board.decide("prop-0-1", Decision::Accept, now()));

        board.generate_proposals(&c, 2).await.unwrap();
        assert_eq!(board.decision("prop-0-1"), Decision::Pending);
        assert!(!board.decide("prop-0-1", Decision::Accept, now()));
        assert_eq!(board.counts().pending, 4);
    }

    #[tokio::test]
    async fn test_accept_all_high_priority_leaves_others_unchanged() {
        let c = client(generating());
        let mut board = ProposalBoard::default();
        board.generate_proposals(&c, 5).await.unwrap();
        board.decide("prop-1-5", Decision::Reject, now());

        assert_eq!(board.accept_all_high_priority(now()), 2);
        assert_eq!(board.decision("prop-0-5"), Decision::Accept);
        assert_eq!(board.decision("prop-1-5"), Decision::Reject);
        assert_eq!(board.decision("prop-2-5"), Decision::Accept);
        assert_eq!(board.decision("prop-3-5"), Decision::Pending);
    }

    #[tokio::test]
    async fn test_accept_all_general() {
        let c = client(generating());
        let mut board = ProposalBoard::default();
        board.generate_proposals(&c, 9).await.unwrap();
        assert_eq!(board.accept_all_general(now()), 2);
        assert_eq!(board.accepted_ids(), vec!["prop-0-9", "prop-3-9"]);
    }

    #[test]
    fn test_decisions_are_reversible() {
        let mut board = ProposalBoard::default();
        board.load_batch(vec![ProposedImprovement {
            id: "p".to_string(),
            ..Default::default()
        }]);
        let t = now();
        board.decide("p", Decision::Accept, t);
        assert_eq!(board.decided_at("p"), Some(t));
        board.decide("p", Decision::Reject, t);
        board.decide("p", Decision::Pending, t);
        assert_eq!(board.decision("p"), Decision::Pending);
        assert_eq!(board.decided_at("p"), None);
    }

    #[tokio::test]
    async fn test_apply_with_nothing_accepted_makes_no_call() {
        let c = client(MockTransport::new());
        let mut board = ProposalBoard::default();
        board.load_batch(vec![ProposedImprovement {
            id: "p".to_string(),
            ..Default::default()
        }]);
        board.decide("p", Decision::Reject, now());

        let err = board.apply_accepted(&c).await.unwrap_err();
        assert!(matches!(err, ScantonError::Validation(_)));
        assert!(c.transport().calls().is_empty());
        assert_eq!(board.proposals().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_posts_accepted_ids_and_clears_batch() {
        let transport = generating().on(
            Method::Post,
            "/learning/apply",
            Reply::Json(json!({"success": true, "version": "1.5.0", "applied": 2})),
        );
        let c = client(transport);
        let mut board = ProposalBoard::default();
        board.generate_proposals(&c, 3).await.unwrap();
        board.accept_all_high_priority(now());

        let result = board.apply_accepted(&c).await.unwrap();
        assert_eq!(result.version.as_deref(), Some("1.5.0"));
        let apply = c.transport().calls().pop().unwrap();
        assert_eq!(
            apply.body,
            Some(json!({"proposalIds": ["prop-0-3", "prop-2-3"], "dryRun": false}))
        );
        assert!(board.proposals().is_empty());
        assert_eq!(board.counts(), DecisionCounts::default());
    }

    #[tokio::test]
    async fn test_failed_apply_keeps_batch() {
        let transport = generating().on(Method::Post, "/learning/apply", Reply::Status(500));
        let c = client(transport);
        let mut board = ProposalBoard::default();
        board.generate_proposals(&c, 3).await.unwrap();
        board.accept_all_general(now());
        assert!(board.apply_accepted(&c).await.is_err());
        assert_eq!(board.accepted_ids().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_reflects_backend_value() {
        let transport = MockTransport::new().on(
            Method::Post,
            "/learning/toggle",
            Reply::Json(json!({"learningMode": false})),
        );
        let c = client(transport);
        let mut board = ProposalBoard {
            learning_mode: Some(false),
            ..Default::default()
        };
        let status = c.toggle_learning_mode().await.unwrap();
        assert!(!board.set_learning_mode(&status));
        assert_eq!(board.learning_mode, Some(false));
    }

    #[tokio::test]
    async fn test_late_status_keeps_newer_batch_and_decisions() {
        let transport = generating().on(
            Method::Get,
            "/learning/status",
            Reply::Json(json!({"learningMode": true, "correctionsCount": 12})),
        );
        let c = client(transport);
        let mut board = ProposalBoard::default();

        // Status is requested first but lands after a batch was generated
        let status = c.learning_status().await.unwrap();
        board.generate_proposals(&c, 4).await.unwrap();
        board.decide("prop-0-4", Decision::Accept, now());

        board.set_status(&status);
        assert_eq!(board.learning_mode, Some(true));
        assert_eq!(board.corrections_count, 12);
        assert_eq!(board.proposals().len(), 4);
        assert_eq!(board.accepted_ids(), vec!["prop-0-4"]);
    }

    #[tokio::test]
    async fn test_fetched_batch_loads_into_current_board() {
        let c = client(generating());
        let mut board = ProposalBoard {
            learning_mode: Some(false),
            ..Default::default()
        };
        let batch = ProposalBoard::fetch_batch(&c, 8).await.unwrap();
        assert!(board.proposals().is_empty());

        // A toggle that completed while the batch was loading survives
        board.learning_mode = Some(true);
        board.load_batch(batch);
        assert_eq!(board.learning_mode, Some(true));
        assert_eq!(board.counts().pending, 4);
    }
}
