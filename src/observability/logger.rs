//! Logging system for orchestration runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::protocol::types::{ToolCall, ToolOutcome};

/// Logger for orchestration runs and transport interactions.
///
/// Produces markdown-formatted log files, one section per event. Each
/// run is tagged with its id so interleaved runs sharing a log file can
/// be told apart. Logging must never sink a run: callers wrap every
/// method in a best-effort helper that reports failures to stderr.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("promptcall");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "run_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_string();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    /// Initialize the log file with header.
    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Orchestration Run Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    /// Append content to log file.
    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    /// Log run start.
    ///
    /// # Arguments
    /// * `run_id` - Unique run identifier.
    /// * `task` - The user task driving the run.
    /// * `tool_names` - Names of tools in the run's snapshot.
    pub fn log_run_start(&self, run_id: &str, task: &str, tool_names: &[String]) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "## Run Started - {}\n\n**Run:** {}\n**Task:** {}\n**Tools:** {}\n\n",
            now.to_rfc3339(),
            run_id,
            task,
            if tool_names.is_empty() {
                "none".to_string()
            } else {
                tool_names.join(", ")
            }
        );

        self.append_to_log(&content)?;
        println!("INFO: Run {} started", run_id);
        Ok(())
    }

    /// Log one transport interaction: the iteration's response and how
    /// it was classified.
    ///
    /// # Arguments
    /// * `run_id` - Unique run identifier.
    /// * `iteration` - 1-based iteration number.
    /// * `response` - Raw response text from the transport.
    /// * `kind` - Classification of the turn ("text" or "tool_call").
    pub fn log_llm_interaction(
        &self,
        run_id: &str,
        iteration: u32,
        response: &str,
        kind: &str,
    ) -> Result<()> {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### LLM Interaction - {}\n\n**Run:** {}\n**Iteration:** {}\n**Kind:** {}\n\n**Response:**\n```\n{}\n```\n\n",
            now.to_rfc3339(),
            run_id,
            iteration,
            kind,
            response
        );

        self.append_to_log(&content)?;
        Ok(())
    }

    /// Log tool execution with its outcome.
    pub fn log_tool_execution(
        &self,
        run_id: &str,
        call: &ToolCall,
        outcome: &ToolOutcome,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let args = serde_json::to_string(&call.args).unwrap_or_default();
        let status = if outcome.is_failure() {
            "Error"
        } else {
            "Result"
        };
        let detail = if outcome.is_failure() {
            outcome.error.clone().unwrap_or_default()
        } else {
            outcome
                .data
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default()
        };

        let content = format!(
            "### Tool Execution - {}\n\n**Run:** {}\n**Tool:** {}\n**Args:** {}\n**{}:** {}\n\n",
            now.to_rfc3339(),
            run_id,
            call.tool,
            args,
            status,
            detail
        );

        self.append_to_log(&content)?;
        println!("INFO: Tool executed: {}", call.tool);
        Ok(())
    }

    /// Log error with run context.
    pub fn log_error(&self, run_id: &str, error: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Error - {}\n\n**Run:** {}\n**Error:** {}\n\n",
            now.to_rfc3339(),
            run_id,
            error
        );

        self.append_to_log(&content)?;
        eprintln!("ERROR: {}", error);
        Ok(())
    }

    /// Log run completion.
    ///
    /// # Arguments
    /// * `run_id` - Unique run identifier.
    /// * `status` - Final run status label.
    /// * `iterations` - Iterations consumed.
    /// * `tool_calls` - Tool calls executed.
    pub fn log_completion(
        &self,
        run_id: &str,
        status: &str,
        iterations: u32,
        tool_calls: u32,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Run Completed - {}\n\n**Run:** {}\n**Status:** {}\n**Iterations:** {}\n**Tool calls:** {}\n\n---\n\n",
            now.to_rfc3339(),
            run_id,
            status,
            iterations,
            tool_calls
        );

        self.append_to_log(&content)?;
        println!("INFO: Run {} completed: {}", run_id, status);
        Ok(())
    }

    /// Log info message.
    pub fn info(&self, message: &str) {
        println!("INFO: {}", message);
    }

    /// Log error message.
    pub fn error(&self, message: &str) {
        eprintln!("ERROR: {}", message);
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(None, None).expect("Failed to create default logger")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn call() -> ToolCall {
        ToolCall {
            tool: "read_file".to_string(),
            args: json!({"path": "config.json"}).as_object().unwrap().clone(),
            reasoning: None,
        }
    }

    #[test]
    fn test_initializes_log_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.md");

        let _logger = Logger::new(Some(&path), None).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Orchestration Run Log"));
    }

    #[test]
    fn test_run_lifecycle_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.md");
        let logger = Logger::new(Some(&path), None).unwrap();

        logger
            .log_run_start("run-1", "Read config.json", &["read_file".to_string()])
            .unwrap();
        logger
            .log_llm_interaction("run-1", 1, "<TOOL_CALL>...", "tool_call")
            .unwrap();
        logger
            .log_tool_execution("run-1", &call(), &ToolOutcome::ok(json!("{}")))
            .unwrap();
        logger.log_completion("run-1", "done", 2, 1).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Run Started"));
        assert!(content.contains("**Task:** Read config.json"));
        assert!(content.contains("**Tools:** read_file"));
        assert!(content.contains("**Kind:** tool_call"));
        assert!(content.contains("**Tool:** read_file"));
        assert!(content.contains("**Status:** done"));
    }

    #[test]
    fn test_empty_response_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.md");
        let logger = Logger::new(Some(&path), None).unwrap();

        logger
            .log_llm_interaction("run-1", 1, "   \n  ", "text")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("LLM Interaction"));
    }

    #[test]
    fn test_tool_failure_logged_as_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.md");
        let logger = Logger::new(Some(&path), None).unwrap();

        logger
            .log_tool_execution("run-1", &call(), &ToolOutcome::failure("File not found: x"))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("**Error:** File not found: x"));
    }
}
