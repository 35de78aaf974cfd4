//! Integration tests for the preflight (single-call) orchestrator.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use serde_json::{json, Map, Value};

use promptcall::prelude::*;
use promptcall::orchestration::{PreflightOptions, WorkspaceOverview};
use promptcall::transport::TransportError;

/// Transport that returns one fixed response and records its options.
struct RecordingTransport {
    response: Result<String, String>,
    last_options: Mutex<Option<CallOptions>>,
}

impl RecordingTransport {
    fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
            last_options: Mutex::new(None),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            last_options: Mutex::new(None),
        })
    }

    fn last_options(&self) -> Option<CallOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn call(&self, _prompt: &str, options: &CallOptions) -> Result<String, TransportError> {
        *self.last_options.lock().unwrap() = Some(options.clone());
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(TransportError::classify(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Handler that serves canned file contents.
struct FixtureReader;

#[async_trait::async_trait]
impl ToolHandler for FixtureReader {
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let path = args.get("path").and_then(|p| p.as_str()).unwrap_or("");
        if path.starts_with("missing") {
            return Ok(ToolOutcome::failure(format!("File not found: {}", path)));
        }
        Ok(ToolOutcome::ok(json!({"content": format!("contents of {}", path)})))
    }
}

fn overview() -> WorkspaceOverview {
    WorkspaceOverview {
        summary: "Rust workspace with 2 files".to_string(),
        tree: "src/\n  main.rs\nCargo.toml".to_string(),
    }
}

#[tokio::test]
async fn test_preflight_single_call_with_attachments() {
    let planner = RecordingTransport::returning(r#"{"files": ["src/main.rs", "Cargo.toml"]}"#);
    let responder = RecordingTransport::returning("It prints hello.");
    let reader = BatchFileReader::new(Arc::new(FixtureReader));
    let orchestrator =
        PreflightOrchestrator::new(planner.clone(), responder.clone(), reader);

    let result = orchestrator
        .run("What does main do?", &overview(), PreflightOptions::default())
        .await;

    assert!(result.success);
    assert_eq!(result.content.as_deref(), Some("It prints hello."));
    assert_eq!(result.iterations, 1);
    assert_eq!(result.total_tool_calls, 2);

    // The reads are recorded as synthetic read_file calls.
    assert!(result.tool_calls.iter().all(|c| c.tool == "read_file"));
    assert_eq!(
        result.tool_calls[0].args.get("path").unwrap(),
        &json!("src/main.rs")
    );

    // Planner ran cold; the answer call carried the files.
    let planner_options = planner.last_options().unwrap();
    assert_eq!(planner_options.temperature, Some(0.1));
    assert!(!planner_options.is_upload());

    let responder_options = responder.last_options().unwrap();
    assert!(responder_options.is_upload());
    assert_eq!(responder_options.attachments.len(), 2);
    assert_eq!(responder_options.attachments[0].path, "src/main.rs");
    assert_eq!(
        responder_options.attachments[0].content,
        "contents of src/main.rs"
    );
    assert_eq!(
        responder_options.workspace_summary.as_deref(),
        Some("Rust workspace with 2 files")
    );
}

#[tokio::test]
async fn test_preflight_unparseable_plan_proceeds_without_files() {
    let planner = RecordingTransport::returning("I would read main.rs first.");
    let responder = RecordingTransport::returning("Answered from the summary alone.");
    let reader = BatchFileReader::new(Arc::new(FixtureReader));
    let orchestrator = PreflightOrchestrator::new(planner, responder.clone(), reader);

    let result = orchestrator
        .run("task", &overview(), PreflightOptions::default())
        .await;

    assert!(result.success);
    assert_eq!(result.total_tool_calls, 0);
    assert!(!responder.last_options().unwrap().is_upload());
}

#[tokio::test]
async fn test_preflight_failed_read_fails_the_run() {
    let planner =
        RecordingTransport::returning(r#"{"files": ["src/main.rs", "missing.txt"]}"#);
    let responder = RecordingTransport::returning("never reached");
    let reader = BatchFileReader::new(Arc::new(FixtureReader));
    let orchestrator = PreflightOrchestrator::new(planner, responder.clone(), reader);

    let result = orchestrator
        .run("task", &overview(), PreflightOptions::default())
        .await;

    assert!(!result.success);
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.failure, Some(FailureKind::Execution));
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to read files: missing.txt")
    );
    // The primary channel was never called.
    assert!(responder.last_options().is_none());
    // The selected reads are still recorded.
    assert_eq!(result.total_tool_calls, 2);
}

#[tokio::test]
async fn test_preflight_planner_selection_is_capped() {
    let planner = RecordingTransport::returning(
        r#"{"files": ["a", "b", "c", "d", "e", "f", "g"]}"#,
    );
    let responder = RecordingTransport::returning("ok");
    let reader = BatchFileReader::new(Arc::new(FixtureReader));
    let orchestrator = PreflightOrchestrator::new(planner, responder, reader);

    let result = orchestrator
        .run("task", &overview(), PreflightOptions::default())
        .await;

    assert!(result.success);
    assert_eq!(result.total_tool_calls, 5);
}

#[tokio::test]
async fn test_preflight_planner_failure_is_transport_failure() {
    let planner = RecordingTransport::failing("Target closed");
    let responder = RecordingTransport::returning("never reached");
    let reader = BatchFileReader::new(Arc::new(FixtureReader));
    let orchestrator = PreflightOrchestrator::new(planner, responder.clone(), reader);

    let result = orchestrator
        .run("task", &overview(), PreflightOptions::default())
        .await;

    assert!(!result.success);
    assert_eq!(
        result.failure,
        Some(FailureKind::Transport { session_lost: true })
    );
    assert!(responder.last_options().is_none());
}
