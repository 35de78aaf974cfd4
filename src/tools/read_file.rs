//! The built-in `read_file` tool.

use crate::protocol::types::ToolOutcome;
use crate::registry::{ToolDefinition, ToolHandler};
use crate::tools::access::AccessPolicy;
use anyhow::Result;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Files above this size are still read, but flagged on stderr.
const LARGE_FILE_BYTES: u64 = 1024 * 1024;

/// Reads a text file by relative or absolute path, subject to an
/// [`AccessPolicy`] the handler treats as authoritative.
///
/// All expected failures (denied access, missing file, directory path,
/// permission errors) are reported as distinct tool outcomes so the
/// failure message shown to the end user names the actual condition.
pub struct ReadFileTool {
    root: PathBuf,
    policy: Arc<dyn AccessPolicy>,
}

impl ReadFileTool {
    /// Create the tool rooted at `root`; relative paths resolve
    /// against it.
    pub fn new(root: impl Into<PathBuf>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// The registry definition for this tool.
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::new(
            "read_file",
            "Read contents of a text file from the file system",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the file (relative or absolute)"
                    }
                },
                "required": ["path"]
            }),
            Arc::new(self),
        )
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ReadFileTool {
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutcome> {
        let path = match args.get("path").and_then(|p| p.as_str()) {
            Some(p) if !p.is_empty() => p,
            _ => return Ok(ToolOutcome::failure("Parameter \"path\" is required")),
        };

        if !self.policy.is_allowed(Path::new(path)) {
            return Ok(ToolOutcome::failure(format!(
                "Access denied: {} is excluded by the workspace access policy",
                path
            )));
        }

        let absolute = self.resolve(Path::new(path));

        let metadata = match tokio::fs::metadata(&absolute).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ToolOutcome::failure(format!("File not found: {}", path)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Ok(ToolOutcome::failure(format!("Permission denied: {}", path)));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            return Ok(ToolOutcome::failure(format!(
                "Path is a directory, not a file: {}",
                path
            )));
        }

        if metadata.len() > LARGE_FILE_BYTES {
            eprintln!(
                "Warning: large file read: {} ({} bytes)",
                path,
                metadata.len()
            );
        }

        let content = match tokio::fs::read_to_string(&absolute).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Ok(ToolOutcome::failure(format!("Permission denied: {}", path)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Ok(ToolOutcome::failure(format!(
                    "File is not valid UTF-8 text: {}",
                    path
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let lines = content.lines().count();
        Ok(ToolOutcome::ok(json!({
            "content": content,
            "metadata": { "size": metadata.len(), "lines": lines }
        })))
    }
}
