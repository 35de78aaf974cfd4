//! Single-shot orchestration with planner preprocessing.
//!
//! Instead of looping over the primary channel, a cheap planner call
//! picks which workspace files the task needs, the files are read
//! locally in one batch, and a single upload-mode call on the primary
//! channel produces the answer. The reads are recorded as synthetic
//! `read_file` tool calls so results stay comparable with the looped
//! runner.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::orchestration::runner::{ExecutionResult, FailureKind, RunStatus};
use crate::protocol::types::ToolCall;
use crate::tools::BatchFileReader;
use crate::transport::{CallOptions, FileAttachment, Transport};

/// Workspace overview handed to the planner.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceOverview {
    /// One-paragraph summary of the workspace.
    pub summary: String,
    /// Rendered directory tree.
    pub tree: String,
}

/// Options for a preflight run.
#[derive(Debug, Clone)]
pub struct PreflightOptions {
    /// Model identifier for the primary call.
    pub model: Option<String>,
    /// Temperature for the primary call.
    pub temperature: f32,
    /// Cap on how many files the planner may select.
    pub max_files: usize,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_files: 5,
        }
    }
}

/// The planner's expected output shape.
#[derive(Debug, Deserialize)]
struct FileSelection {
    #[serde(default)]
    files: Vec<String>,
}

/// One-call orchestrator: planner file selection, local batch read,
/// single upload-mode answer call.
pub struct PreflightOrchestrator {
    planner: Arc<dyn Transport>,
    responder: Arc<dyn Transport>,
    reader: BatchFileReader,
}

impl PreflightOrchestrator {
    /// Create a preflight orchestrator.
    ///
    /// # Arguments
    /// * `planner` - Cheap channel used only for file selection.
    /// * `responder` - Primary channel that produces the answer.
    /// * `reader` - Batch reader backed by the workspace read tool.
    pub fn new(
        planner: Arc<dyn Transport>,
        responder: Arc<dyn Transport>,
        reader: BatchFileReader,
    ) -> Self {
        Self {
            planner,
            responder,
            reader,
        }
    }

    /// Run a task as one planned, upload-mode call.
    ///
    /// `iterations` in the result is always 1: the primary channel is
    /// called exactly once.
    pub async fn run(
        &self,
        task: &str,
        overview: &WorkspaceOverview,
        options: PreflightOptions,
    ) -> ExecutionResult {
        let started = Instant::now();

        let planner_prompt = Self::build_planner_prompt(task, overview);
        let planner_options = CallOptions {
            temperature: Some(0.1),
            ..CallOptions::default()
        };
        let selection = match self.planner.call(&planner_prompt, &planner_options).await {
            Ok(response) => {
                let mut files = Self::parse_file_list(&response);
                files.truncate(options.max_files);
                files
            }
            Err(err) => {
                return Self::result(
                    RunStatus::Failed,
                    Some(FailureKind::Transport {
                        session_lost: err.is_session_lost(),
                    }),
                    None,
                    Some(err.to_string()),
                    Vec::new(),
                    started.elapsed(),
                );
            }
        };

        let tool_calls: Vec<ToolCall> = selection
            .iter()
            .map(|path| ToolCall {
                tool: "read_file".to_string(),
                args: [("path".to_string(), serde_json::Value::String(path.clone()))]
                    .into_iter()
                    .collect(),
                reasoning: Some("Selected by planner preprocessing".to_string()),
            })
            .collect();

        let contents = self.reader.read_files(&selection).await;
        let failed: Vec<&str> = contents
            .iter()
            .filter(|f| !f.success)
            .map(|f| f.path.as_str())
            .collect();
        if !failed.is_empty() {
            return Self::result(
                RunStatus::Failed,
                Some(FailureKind::Execution),
                None,
                Some(format!("Failed to read files: {}", failed.join(", "))),
                tool_calls,
                started.elapsed(),
            );
        }

        let attachments: Vec<FileAttachment> = contents
            .into_iter()
            .map(|f| FileAttachment {
                path: f.path,
                content: f.content,
            })
            .collect();
        let call_options = CallOptions {
            model: options.model.clone(),
            temperature: Some(options.temperature),
            attachments,
            workspace_summary: Some(overview.summary.clone()),
        };

        match self.responder.call(task, &call_options).await {
            Ok(answer) => Self::result(
                RunStatus::Done,
                None,
                Some(answer),
                None,
                tool_calls,
                started.elapsed(),
            ),
            Err(err) => Self::result(
                RunStatus::Failed,
                Some(FailureKind::Transport {
                    session_lost: err.is_session_lost(),
                }),
                None,
                Some(err.to_string()),
                tool_calls,
                started.elapsed(),
            ),
        }
    }

    fn build_planner_prompt(task: &str, overview: &WorkspaceOverview) -> String {
        format!(
            "You are a file selector AI. Analyze the user's question and workspace structure to determine which files need to be read.\n\n\
Workspace Summary:\n{}\n\n\
Workspace Structure:\n{}\n\n\
User Question:\n{}\n\n\
Task: Return a JSON array of file paths that need to be read to answer the question.\n\n\
Output format (JSON only, no explanation):\n\
{{\n  \"files\": [\"path/to/file1.rs\", \"path/to/file2.json\"]\n}}\n\n\
Rules:\n\
- Only return files that DIRECTLY help answer the question\n\
- Use relative paths from workspace root\n\
- Maximum 5 files\n\
- If no files needed, return empty array\n\
- NO markdown, ONLY JSON",
            overview.summary, overview.tree, task
        )
    }

    /// Parse the planner's file selection. An unparseable response
    /// means no files: the answer call proceeds without attachments.
    fn parse_file_list(response: &str) -> Vec<String> {
        let cleaned = response
            .replace("```json", "")
            .replace("```", "")
            .trim()
            .to_string();

        match serde_json::from_str::<FileSelection>(&cleaned) {
            Ok(selection) => selection.files,
            Err(_) => {
                eprintln!("WARN: Failed to parse planner file selection");
                Vec::new()
            }
        }
    }

    fn result(
        status: RunStatus,
        failure: Option<FailureKind>,
        content: Option<String>,
        error: Option<String>,
        tool_calls: Vec<ToolCall>,
        duration: Duration,
    ) -> ExecutionResult {
        let total_tool_calls = tool_calls.len() as u32;
        ExecutionResult {
            success: status == RunStatus::Done,
            status,
            failure,
            content,
            error,
            iterations: 1,
            messages: Vec::new(),
            tool_calls,
            total_tool_calls,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_list_plain_json() {
        let files =
            PreflightOrchestrator::parse_file_list(r#"{"files": ["src/main.rs", "Cargo.toml"]}"#);
        assert_eq!(files, vec!["src/main.rs", "Cargo.toml"]);
    }

    #[test]
    fn test_parse_file_list_strips_code_fences() {
        let response = "```json\n{\"files\": [\"src/lib.rs\"]}\n```";
        let files = PreflightOrchestrator::parse_file_list(response);
        assert_eq!(files, vec!["src/lib.rs"]);
    }

    #[test]
    fn test_parse_file_list_unparseable_is_empty() {
        let files = PreflightOrchestrator::parse_file_list("I think you need main.rs");
        assert!(files.is_empty());
    }

    #[test]
    fn test_parse_file_list_missing_field_is_empty() {
        let files = PreflightOrchestrator::parse_file_list("{}");
        assert!(files.is_empty());
    }

    #[test]
    fn test_planner_prompt_embeds_overview() {
        let overview = WorkspaceOverview {
            summary: "Small Rust workspace".to_string(),
            tree: "src/\n  main.rs".to_string(),
        };

        let prompt = PreflightOrchestrator::build_planner_prompt("What does main do?", &overview);
        assert!(prompt.contains("Small Rust workspace"));
        assert!(prompt.contains("  main.rs"));
        assert!(prompt.contains("What does main do?"));
        assert!(prompt.contains("ONLY JSON"));
    }
}
