//! Normalization of Scan API vote results.
//!
//! The raw `dso_rules_vote_results` entries vary by ledger version: votes come
//! either as `[sv, vote]` pairs or as an object keyed by SV, the outcome is a
//! tagged `VRO_*` variant, and most fields may be absent. Everything is read
//! off `serde_json::Value` and defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    Accepted,
    Rejected,
    Expired,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub action: String,
    pub requester: String,
    pub reason_url: Option<String>,
    pub reason_body: Option<String>,
    pub completed_at: Option<String>,
    pub effective_at: Option<String>,
    pub accepted: u32,
    pub rejected: u32,
    pub abstained: u32,
    pub status: VoteStatus,
}

impl VoteOutcome {
    pub fn total_votes(&self) -> u32 {
        self.accepted + self.rejected
    }
}

pub fn normalize_vote_result(raw: &Value) -> VoteOutcome {
    let request = raw.get("request").unwrap_or(&Value::Null);

    let (accepted, rejected) = count_votes(request.get("votes").unwrap_or(&Value::Null));
    let abstained = raw
        .get("abstainingSvs")
        .and_then(Value::as_array)
        .map(|a| a.len() as u32)
        .unwrap_or(0);

    let outcome = raw.get("outcome").unwrap_or(&Value::Null);
    let tag = outcome
        .as_str()
        .or_else(|| outcome.get("tag").and_then(Value::as_str));
    let status = match tag {
        Some("VRO_Accepted") => VoteStatus::Accepted,
        Some("VRO_Rejected") => VoteStatus::Rejected,
        Some("VRO_Expired") => VoteStatus::Expired,
        _ => VoteStatus::Unknown,
    };

    VoteOutcome {
        action: action_name(request.get("action").unwrap_or(&Value::Null)),
        requester: str_at(request, "requester").unwrap_or_default(),
        reason_url: request
            .get("reason")
            .and_then(|r| str_at(r, "url"))
            .filter(|s| !s.is_empty()),
        reason_body: request
            .get("reason")
            .and_then(|r| str_at(r, "body"))
            .filter(|s| !s.is_empty()),
        completed_at: str_at(raw, "completedAt"),
        effective_at: outcome.get("value").and_then(|v| str_at(v, "effectiveAt")),
        accepted,
        rejected,
        abstained,
        status,
    }
}

fn str_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Innermost action tag, e.g. `SRARC_GrantFeaturedAppRight` nested under
/// `ARC_DsoRules`.
fn action_name(action: &Value) -> String {
    let mut current = action;
    let mut name = None;
    while let Some(tag) = current.get("tag").and_then(Value::as_str) {
        name = Some(tag);
        match current.get("value").and_then(|v| v.get("dsoAction").or_else(|| v.get("amuletRulesAction"))) {
            Some(next) => current = next,
            None => break,
        }
    }
    name.unwrap_or("Unknown").to_string()
}

fn vote_accepts(vote: &Value) -> Option<bool> {
    vote.get("accept").and_then(Value::as_bool)
}

fn count_votes(votes: &Value) -> (u32, u32) {
    let decisions: Vec<bool> = match votes {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Array(pair) => pair.get(1).and_then(vote_accepts),
                other => vote_accepts(other),
            })
            .collect(),
        Value::Object(map) => map.values().filter_map(vote_accepts).collect(),
        _ => Vec::new(),
    };
    let accepted = decisions.iter().filter(|a| **a).count() as u32;
    (accepted, decisions.len() as u32 - accepted)
}
