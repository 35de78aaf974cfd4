//! Concurrent multi-file reads for the preflight orchestrator.
//!
//! The core loop is strictly sequential; this is the one place where
//! independent tool invocations run concurrently and are joined before
//! anything proceeds.

use crate::registry::ToolHandler;
use futures_util::future::join_all;
use serde_json::{json, Map};
use std::sync::Arc;

/// Outcome of reading one file in a batch.
#[derive(Debug, Clone)]
pub struct FileContent {
    /// Path as requested.
    pub path: String,
    /// File contents (empty on failure).
    pub content: String,
    /// Whether the read succeeded.
    pub success: bool,
    /// Error description on failure.
    pub error: Option<String>,
}

/// Reads multiple files through a `read_file`-shaped handler.
pub struct BatchFileReader {
    handler: Arc<dyn ToolHandler>,
}

impl BatchFileReader {
    /// Create a batch reader over the given handler.
    pub fn new(handler: Arc<dyn ToolHandler>) -> Self {
        Self { handler }
    }

    /// Read all paths concurrently, preserving input order in the result.
    pub async fn read_files(&self, paths: &[String]) -> Vec<FileContent> {
        let reads = paths.iter().map(|path| {
            let handler = Arc::clone(&self.handler);
            let path = path.clone();
            async move {
                let mut args = Map::new();
                args.insert("path".to_string(), json!(path));

                match handler.execute(&args).await {
                    Ok(outcome) if outcome.success => {
                        let content = outcome
                            .data
                            .as_ref()
                            .and_then(|d| d.get("content"))
                            .and_then(|c| c.as_str())
                            .or_else(|| outcome.data.as_ref().and_then(|d| d.as_str()))
                            .unwrap_or_default()
                            .to_string();
                        FileContent {
                            path,
                            content,
                            success: true,
                            error: None,
                        }
                    }
                    Ok(outcome) => FileContent {
                        path,
                        content: String::new(),
                        success: false,
                        error: outcome.error,
                    },
                    Err(e) => FileContent {
                        path,
                        content: String::new(),
                        success: false,
                        error: Some(e.to_string()),
                    },
                }
            }
        });

        join_all(reads).await
    }

    /// Render successful reads as fenced blocks for a prompt.
    pub fn format_for_prompt(files: &[FileContent]) -> String {
        files
            .iter()
            .filter(|f| f.success)
            .map(|f| format!("### File: {}\n```\n{}\n```", f.path, f.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::access::AllowAll;
    use crate::tools::read_file::ReadFileTool;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.txt"), "beta").unwrap();
        dir
    }

    fn reader(dir: &TempDir) -> BatchFileReader {
        BatchFileReader::new(Arc::new(ReadFileTool::new(dir.path(), Arc::new(AllowAll))))
    }

    #[tokio::test]
    async fn test_reads_preserve_order() {
        let dir = workspace();
        let reader = reader(&dir);

        let results = reader
            .read_files(&["b.txt".to_string(), "a.txt".to_string()])
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, "b.txt");
        assert_eq!(results[0].content, "beta");
        assert_eq!(results[1].content, "alpha");
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn test_failures_are_collected_not_fatal() {
        let dir = workspace();
        let reader = reader(&dir);

        let results = reader
            .read_files(&["a.txt".to_string(), "missing.txt".to_string()])
            .await;

        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().contains("File not found"));
    }

    #[tokio::test]
    async fn test_format_for_prompt_skips_failures() {
        let dir = workspace();
        let reader = reader(&dir);

        let results = reader
            .read_files(&["a.txt".to_string(), "missing.txt".to_string()])
            .await;
        let rendered = BatchFileReader::format_for_prompt(&results);

        assert!(rendered.contains("### File: a.txt"));
        assert!(rendered.contains("alpha"));
        assert!(!rendered.contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let dir = workspace();
        let reader = reader(&dir);

        let results = reader.read_files(&[]).await;
        assert!(results.is_empty());
        assert_eq!(BatchFileReader::format_for_prompt(&results), "");
    }
}
