use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScantonError;

/// How a golden item exercises the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoldenCategory {
    #[default]
    Standard,
    EdgeCase,
    Boundary,
}

impl GoldenCategory {
    pub const ALL: [GoldenCategory; 3] = [
        GoldenCategory::Standard,
        GoldenCategory::EdgeCase,
        GoldenCategory::Boundary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoldenCategory::Standard => "standard",
            GoldenCategory::EdgeCase => "edge_case",
            GoldenCategory::Boundary => "boundary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// Governance item types the classifier distinguishes.
pub const GOVERNANCE_TYPES: [&str; 6] = [
    "cip",
    "featured-app",
    "validator",
    "protocol-upgrade",
    "outcome",
    "other",
];

/// A manually verified benchmark entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldenItem {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
    pub true_type: String,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub added_by: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category: GoldenCategory,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub frozen: bool,
}

/// Payload for adding a golden item. The backend stamps `addedAt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldenItemDraft {
    pub id: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub true_type: String,
    pub category: GoldenCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub added_by: String,
}

impl GoldenItemDraft {
    /// `id`, `subject` and `trueType` must be non-blank.
    pub fn validate(&self) -> Result<(), ScantonError> {
        let missing: Vec<&str> = [
            ("id", &self.id),
            ("subject", &self.subject),
            ("trueType", &self.true_type),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScantonError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Breakdown {
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
}

/// An item whose prediction changed between classifier versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemChange {
    pub item_id: String,
    pub subject: String,
    pub expected: String,
    pub previous_prediction: Option<String>,
    pub current_prediction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationResult {
    pub classifier_version: String,
    pub evaluated_at: String,
    pub golden_set_size: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: f64,
    pub by_type: BTreeMap<String, Breakdown>,
    pub by_category: BTreeMap<String, Breakdown>,
    pub regressions: Vec<ItemChange>,
    pub improvements: Vec<ItemChange>,
    pub previous_accuracy: Option<f64>,
    pub accuracy_delta: Option<f64>,
    pub previous_version: Option<String>,
}

impl EvaluationResult {
    /// Delta against the previous run, derived when the backend omits it.
    pub fn delta(&self) -> Option<f64> {
        self.accuracy_delta
            .or_else(|| self.previous_accuracy.map(|prev| self.accuracy - prev))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldenSetSummary {
    pub total_items: u32,
    pub by_type: BTreeMap<String, u32>,
    pub by_category: BTreeMap<String, u32>,
    pub last_evaluation: Option<EvaluationResult>,
}

/// A governance item from the broader lifecycle listing, before it has a
/// verified label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceItem {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "type")]
    pub inferred_type: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    #[serde(other)]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalScope {
    General,
    Entity,
    Instance,
    #[serde(other)]
    Other,
}

/// A change the backend suggests after studying manual corrections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedImprovement {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub code_change: Option<String>,
    #[serde(default)]
    pub prompt_addition: Option<String>,
    #[serde(default)]
    pub examples: Option<Vec<String>>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub evidence_count: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub scope: Option<ProposalScope>,
    #[serde(default)]
    pub provenance: Option<serde_json::Value>,
    #[serde(default)]
    pub learning_layer: Option<String>,
    #[serde(default)]
    pub prompt_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
    #[default]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDecision {
    pub proposal_id: String,
    pub decision: Decision,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternSet {
    pub entity_name_mappings: BTreeMap<String, String>,
    /// Keyword lists keyed by category, e.g. `cipKeywords`.
    #[serde(flatten)]
    pub keywords: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternHistoryEntry {
    pub version: String,
    pub generated_at: String,
    pub based_on_corrections: u32,
    pub changes: Option<String>,
}

/// Versioned rule bundle consumed by the external classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnedPatterns {
    pub version: String,
    pub previous_version: Option<String>,
    pub generated_at: String,
    pub based_on_corrections: u32,
    pub learning_mode: bool,
    pub patterns: PatternSet,
    pub history: Vec<PatternHistoryEntry>,
}

impl LearnedPatterns {
    pub fn keyword_count(&self) -> usize {
        self.patterns.keywords.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_validation_lists_missing_fields() {
        let draft = GoldenItemDraft {
            id: "gov-1".to_string(),
            subject: "  ".to_string(),
            true_type: String::new(),
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(
            err,
            ScantonError::Validation("Missing required fields: subject, trueType".to_string())
        );
    }

    #[test]
    fn test_golden_item_tolerates_missing_optional_fields() {
        let item: GoldenItem = serde_json::from_value(json!({
            "id": "g1",
            "subject": "CIP-0042 vote",
            "trueType": "cip",
            "category": "edge_case"
        }))
        .unwrap();
        assert_eq!(item.category, GoldenCategory::EdgeCase);
        assert!(!item.frozen);
        assert!(item.body.is_none());
    }

    #[test]
    fn test_unknown_priority_falls_back_to_low() {
        let p: ProposedImprovement =
            serde_json::from_value(json!({"priority": "urgent", "type": "keyword"})).unwrap();
        assert_eq!(p.priority, Priority::Low);
        assert_eq!(p.kind, "keyword");
    }

    #[test]
    fn test_pattern_set_splits_keywords_from_mappings() {
        let patterns: LearnedPatterns = serde_json::from_value(json!({
            "version": "1.4.0",
            "patterns": {
                "cipKeywords": ["cip", "proposal"],
                "validatorKeywords": ["onboard"],
                "entityNameMappings": {"DA": "Digital Asset"}
            }
        }))
        .unwrap();
        assert_eq!(patterns.keyword_count(), 3);
        assert_eq!(
            patterns.patterns.entity_name_mappings.get("DA").map(String::as_str),
            Some("Digital Asset")
        );
        assert!(!patterns.patterns.keywords.contains_key("entityNameMappings"));
    }

    #[test]
    fn test_evaluation_delta_is_derived() {
        let eval = EvaluationResult {
            accuracy: 0.9,
            previous_accuracy: Some(0.85),
            ..Default::default()
        };
        let delta = eval.delta().unwrap();
        assert!((delta - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(GoldenCategory::parse("boundary"), Some(GoldenCategory::Boundary));
        assert_eq!(GoldenCategory::parse("nope"), None);
    }
}
