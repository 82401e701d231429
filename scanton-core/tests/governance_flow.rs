//! End-to-end workflows against a scripted backend.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use scanton_core::api::backfill::RecoveryRequest;
use scanton_core::types::{Decision, GoldenItemDraft, GoldenCategory};
use scanton_core::workflow::{run_recovery, GoldenSetState, ProposalBoard, RecoveryLog, RecoveryPhase};
use scanton_core::{ApiConfig, ApiRequest, Method, ScantonClient, ScantonError, Transport};

/// Answers by `(method, path)` and records every request it sees.
#[derive(Default)]
struct ScriptedBackend {
    json: HashMap<(Method, String), Value>,
    stream: Option<Vec<&'static str>>,
    seen: RefCell<Vec<ApiRequest>>,
}

impl ScriptedBackend {
    fn reply(mut self, method: Method, path: &str, body: Value) -> Self {
        self.json.insert((method, path.to_string()), body);
        self
    }

    fn with_stream(mut self, chunks: Vec<&'static str>) -> Self {
        self.stream = Some(chunks);
        self
    }

    fn path_of(url: &str) -> String {
        let without_query = url.split('?').next().unwrap_or_default();
        url::Url::parse(without_query)
            .map(|u| u.path().to_string())
            .unwrap_or_default()
    }

    fn count(&self, method: Method, prefix: &str) -> usize {
        self.seen
            .borrow()
            .iter()
            .filter(|r| r.method == method && Self::path_of(&r.url).starts_with(prefix))
            .count()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedBackend {
    async fn send(&self, request: ApiRequest) -> Result<Value, ScantonError> {
        self.seen.borrow_mut().push(request.clone());
        let path = Self::path_of(&request.url);
        if request.method == Method::Delete {
            return Ok(Value::Null);
        }
        self.json
            .get(&(request.method, path))
            .cloned()
            .ok_or(ScantonError::Http {
                status: 404,
                url: request.url,
            })
    }

    async fn stream(
        &self,
        request: ApiRequest,
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8])),
    ) -> Result<(), ScantonError> {
        self.seen.borrow_mut().push(request.clone());
        let chunks = self.stream.clone().ok_or(ScantonError::Http {
            status: 404,
            url: request.url,
        })?;
        for chunk in chunks {
            on_chunk(chunk.as_bytes());
        }
        Ok(())
    }
}

fn golden_backend() -> ScriptedBackend {
    ScriptedBackend::default()
        .reply(
            Method::Get,
            "/api/governance-lifecycle/golden-set/summary",
            json!({"totalItems": 2, "byType": {"cip": 1, "featured-app": 1}}),
        )
        .reply(
            Method::Get,
            "/api/governance-lifecycle/golden-set",
            json!({"items": [
                {"id": "g-1", "subject": "CIP-0051 vote", "trueType": "cip", "category": "standard"},
                {"id": "g-2", "subject": "Featured app: Acme", "trueType": "featured-app", "category": "edge_case"}
            ]}),
        )
        .reply(
            Method::Get,
            "/api/governance-lifecycle/golden-set/evaluations",
            json!({"evaluations": [
                {"classifierVersion": "v1", "evaluatedAt": "2025-01-01T00:00:00Z", "accuracy": 0.8},
                {"classifierVersion": "v2", "evaluatedAt": "2025-02-01T00:00:00Z", "accuracy": 0.9}
            ]}),
        )
        .reply(
            Method::Post,
            "/api/governance-lifecycle/golden-set/items",
            json!({"success": true}),
        )
}

#[tokio::test]
async fn test_golden_set_add_then_clear() {
    let client = ScantonClient::with_transport(ApiConfig::default(), golden_backend());
    let mut state = GoldenSetState::default();

    assert_eq!(state.fetch_data(&client).await, 0);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.latest_evaluation().map(|e| e.classifier_version.as_str()), Some("v2"));

    let blank = GoldenItemDraft {
        id: "g-3".into(),
        ..Default::default()
    };
    assert!(state.add_item(&client, &blank).await.is_err());
    assert_eq!(client.transport().count(Method::Post, "/api/governance-lifecycle/golden-set/items"), 0);

    let draft = GoldenItemDraft {
        id: "g-3".into(),
        subject: "Validator onboarding".into(),
        true_type: "validator".into(),
        category: GoldenCategory::Standard,
        added_by: "reviewer".into(),
        ..Default::default()
    };
    state.add_item(&client, &draft).await.unwrap();
    assert_eq!(client.transport().count(Method::Post, "/api/governance-lifecycle/golden-set/items"), 1);

    let outcome = state.clear_golden_set(&client, "reset benchmark").await;
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(client.transport().count(Method::Delete, "/api/governance-lifecycle/golden-set/items/"), 2);
}

#[tokio::test]
async fn test_proposal_review_and_apply() {
    let backend = ScriptedBackend::default()
        .reply(
            Method::Get,
            "/api/governance-lifecycle/learning/improvements",
            json!({"improvements": [
                {"type": "keyword", "priority": "high", "scope": "general", "description": "add 'featured app' keyword"},
                {"type": "mapping", "priority": "low", "scope": "entity", "description": "map Acme"}
            ]}),
        )
        .reply(
            Method::Post,
            "/api/governance-lifecycle/learning/generate-patterns",
            json!({"proposedChanges": [
                {"type": "keyword", "priority": "high", "scope": "instance", "description": "tokenomics"}
            ]}),
        )
        .reply(
            Method::Post,
            "/api/governance-lifecycle/learning/apply",
            json!({"success": true, "version": "1.4.0", "applied": 2}),
        );
    let client = ScantonClient::with_transport(ApiConfig::default(), backend);
    let now = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
    let mut board = ProposalBoard::default();

    assert_eq!(board.generate_proposals(&client, now.timestamp_millis()).await.unwrap(), 3);
    assert_eq!(board.counts().pending, 3);

    assert_eq!(board.accept_all_high_priority(now), 2);
    let low = board.proposals()[1].id.clone();
    assert_eq!(board.decision(&low), Decision::Pending);

    let applied = board.apply_accepted(&client).await.unwrap();
    assert_eq!(applied.version.as_deref(), Some("1.4.0"));
    assert!(board.proposals().is_empty());

    let apply_body = client
        .transport()
        .seen
        .borrow()
        .iter()
        .find(|r| r.url.ends_with("/learning/apply"))
        .and_then(|r| r.body.clone())
        .unwrap();
    assert_eq!(apply_body["proposalIds"].as_array().unwrap().len(), 2);
    assert_eq!(apply_body["dryRun"], false);

    // Nothing accepted now: refused before any request goes out.
    assert!(board.apply_accepted(&client).await.is_err());
    assert_eq!(client.transport().count(Method::Post, "/api/governance-lifecycle/learning/apply"), 1);
}

#[tokio::test]
async fn test_recovery_stream_to_completion() {
    let backend = ScriptedBackend::default().with_stream(vec![
        "data: {\"type\":\"start\",\"totalGaps\":2}\n",
        "recovering gap 1\ndata: {\"type\":\"progress\",\"gapIndex\":1,",
        "\"totalGaps\":2}\n",
        "data: {\"type\":\"complete\",\"done\":true,\"recoveredEvents\":42}\n",
    ]);
    let client = ScantonClient::with_transport(ApiConfig::default(), backend);
    let mut log = RecoveryLog::default();
    log.start();

    let request = RecoveryRequest {
        max_gaps: Some(2),
        dry_run: false,
    };
    let result = run_recovery(&client, &request, &mut |event| log.apply(event)).await;
    log.finish(&result);

    assert_eq!(log.phase, RecoveryPhase::Completed);
    assert_eq!(log.lines, vec!["recovering gap 1"]);
    assert_eq!(log.progress.as_ref().and_then(|p| p.recovered_events), Some(42));
    assert_eq!(client.transport().count(Method::Post, "/api/backfill/gaps/recover"), 1);
}

#[test]
fn test_config_override_points_requests_at_new_backend() {
    let config = ApiConfig::default()
        .with_duckdb_override(Some("https://duckdb.internal:8443/"))
        .unwrap();
    assert!(config
        .duckdb("/api/backfill/shards")
        .starts_with("https://duckdb.internal:8443/api/"));
    assert!(ApiConfig::default().with_duckdb_override(Some("ftp://nope")).is_err());
}
