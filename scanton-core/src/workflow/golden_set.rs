//! Golden set management: the client view of the benchmark the external
//! classifier is scored against.
//!
//! State lives in a plain `GoldenSetState` so the UI can keep it in a signal;
//! every operation borrows a client for the duration of its requests. After a
//! successful write the whole state is pulled again rather than patched.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::api::ScantonClient;
use crate::error::ScantonError;
use crate::transport::Transport;
use crate::types::{
    EvaluationResult, GoldenCategory, GoldenItem, GoldenItemDraft, GoldenSetSummary,
    GovernanceItem,
};

/// How many lifecycle items are pulled when sampling candidates.
const SAMPLE_POOL_LIMIT: usize = 500;

/// A governance item staged for truth assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCandidate {
    pub item: GovernanceItem,
    pub selected: bool,
    pub true_type: String,
    pub category: GoldenCategory,
}

impl SampleCandidate {
    fn new(item: GovernanceItem) -> Self {
        Self {
            item,
            selected: false,
            true_type: String::new(),
            category: GoldenCategory::Standard,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.selected && !self.true_type.trim().is_empty()
    }

    fn to_draft(&self, added_by: &str) -> GoldenItemDraft {
        GoldenItemDraft {
            id: self.item.id.clone(),
            subject: self.item.subject.clone(),
            body: self.item.body.clone(),
            true_type: self.true_type.trim().to_string(),
            category: self.category,
            notes: Some("Sampled from existing items".to_string()),
            source_url: self.item.source_url.clone(),
            added_by: added_by.to_string(),
        }
    }
}

/// Tally of a sequential best-effort bulk operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldenSetState {
    pub summary: Option<GoldenSetSummary>,
    pub items: Vec<GoldenItem>,
    /// Newest first.
    pub history: Vec<EvaluationResult>,
    pub staged: Vec<SampleCandidate>,
    last_version_ms: Option<i64>,
}

impl GoldenSetState {
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn latest_evaluation(&self) -> Option<&EvaluationResult> {
        self.history.first()
    }

    /// Fetch summary, items and history together. Each slice of state is only
    /// replaced when its own request succeeded. Returns how many failed.
    pub async fn fetch_data<T: Transport>(&mut self, client: &ScantonClient<T>) -> usize {
        let (summary, items, history) = futures_util::join!(
            client.golden_set_summary(),
            client.golden_set(),
            client.evaluation_history()
        );

        let mut failures = 0;
        match summary {
            Ok(s) => self.summary = Some(s),
            Err(e) => {
                warn!("Golden set summary unavailable: {}", e);
                failures += 1;
            }
        }
        match items {
            Ok(i) => self.items = i,
            Err(e) => {
                warn!("Golden set items unavailable: {}", e);
                failures += 1;
            }
        }
        match history {
            Ok(mut h) => {
                h.sort_by(|a, b| b.evaluated_at.cmp(&a.evaluated_at));
                self.history = h;
            }
            Err(e) => {
                warn!("Evaluation history unavailable: {}", e);
                failures += 1;
            }
        }
        failures
    }

    pub async fn add_item<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        draft: &GoldenItemDraft,
    ) -> Result<(), ScantonError> {
        draft.validate()?;
        client.add_golden_item(draft).await?;
        self.fetch_data(client).await;
        Ok(())
    }

    pub async fn remove_item<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        id: &str,
        reason: &str,
    ) -> Result<(), ScantonError> {
        client.remove_golden_item(id, reason).await?;
        self.fetch_data(client).await;
        Ok(())
    }

    /// Stage up to `count` lifecycle items that are not yet in the golden set.
    /// The shuffle is seeded so a given seed always stages the same items.
    pub async fn sample_from_existing<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        count: usize,
        seed: u64,
    ) -> Result<usize, ScantonError> {
        let pool = client.governance_items(SAMPLE_POOL_LIMIT).await?;
        let existing: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();

        let mut candidates: Vec<GovernanceItem> = pool
            .into_iter()
            .filter(|item| !existing.contains(item.id.as_str()))
            .collect();
        candidates.shuffle(&mut StdRng::seed_from_u64(seed));
        candidates.truncate(count);

        info!("Staged {} of {} requested samples", candidates.len(), count);
        self.staged = candidates.into_iter().map(SampleCandidate::new).collect();
        Ok(self.staged.len())
    }

    /// POST every ready candidate one at a time. Failures are counted and the
    /// loop carries on; failed candidates stay staged.
    pub async fn add_sampled_items<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        added_by: &str,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        let mut added: HashSet<String> = HashSet::new();

        for candidate in self.staged.iter().filter(|c| c.is_ready()) {
            match client.add_golden_item(&candidate.to_draft(added_by)).await {
                Ok(()) => {
                    outcome.succeeded += 1;
                    added.insert(candidate.item.id.clone());
                }
                Err(e) => {
                    warn!("Failed to add sampled item {}: {}", candidate.item.id, e);
                    outcome.failed += 1;
                }
            }
        }

        if outcome.succeeded > 0 {
            self.staged.retain(|c| !added.contains(&c.item.id));
            self.fetch_data(client).await;
        }
        outcome
    }

    /// Delete every item currently loaded, one request each, no retries.
    pub async fn clear_golden_set<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        reason: &str,
    ) -> BulkOutcome {
        let ids: Vec<String> = self.items.iter().map(|i| i.id.clone()).collect();
        let mut outcome = BulkOutcome::default();

        for id in &ids {
            match client.remove_golden_item(id, reason).await {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    warn!("Failed to remove {}: {}", id, e);
                    outcome.failed += 1;
                }
            }
        }

        info!(
            "Cleared golden set: {} removed, {} failed",
            outcome.succeeded, outcome.failed
        );
        self.fetch_data(client).await;
        outcome
    }

    /// Score a freshly named classifier version and prepend the result.
    pub async fn run_evaluation<T: Transport>(
        &mut self,
        client: &ScantonClient<T>,
        now: DateTime<Utc>,
    ) -> Result<EvaluationResult, ScantonError> {
        let version = self.next_classifier_version(now);
        let result = client.evaluate_golden_set(&version).await?;
        info!(
            "Evaluated {}: {:.1}% over {} items",
            version,
            result.accuracy * 100.0,
            result.golden_set_size
        );
        self.history.insert(0, result.clone());
        Ok(result)
    }

    /// `v<millis>`, strictly increasing within this state's lifetime.
    fn next_classifier_version(&mut self, now: DateTime<Utc>) -> String {
        let mut ms = now.timestamp_millis();
        if let Some(last) = self.last_version_ms {
            ms = ms.max(last + 1);
        }
        self.last_version_ms = Some(ms);
        format!("v{}", ms)
    }
}
