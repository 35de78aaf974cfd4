//! Tool definition type and the async handler contract.

use crate::protocol::types::ToolOutcome;
use anyhow::Result;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// Async handler backing a tool.
///
/// A handler reports expected failures (missing file, denied access)
/// through [`ToolOutcome`] with `success: false`; returning `Err` is
/// reserved for unexpected faults, which the orchestrator converts into
/// the same failure shape at the top of its loop.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutcome>;
}

/// A callable capability: name, description, JSON-Schema parameter
/// spec, and the handler invoked during dispatch.
///
/// Definitions are registered once at process start and handed to each
/// run as part of an immutable snapshot; the handler is shared behind
/// an `Arc`, so cloning a definition is cheap.
#[derive(Clone)]
pub struct ToolDefinition {
    /// Unique identifier, used for lookup during dispatch.
    pub name: String,
    /// Human-readable description for LLM consumption.
    pub description: String,
    /// JSON Schema describing the accepted arguments.
    pub parameters: Value,
    /// Handler invoked when the model calls this tool.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// Create a definition whose handler always fails.
    ///
    /// Useful for catalog rendering and tests that never dispatch.
    pub fn schema_only(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self::new(name, description, parameters, Arc::new(UnboundHandler))
    }

    /// Create a definition with an empty parameter schema.
    pub fn new_simple(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self::new(
            name,
            description,
            json!({
                "type": "object",
                "properties": {}
            }),
            handler,
        )
    }

    /// Check if this tool has any parameters defined.
    pub fn has_parameters(&self) -> bool {
        self.parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|obj| !obj.is_empty())
            .unwrap_or(false)
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Placeholder handler for schema-only definitions.
struct UnboundHandler;

#[async_trait::async_trait]
impl ToolHandler for UnboundHandler {
    async fn execute(&self, _args: &Map<String, Value>) -> Result<ToolOutcome> {
        Ok(ToolOutcome::failure("Tool has no bound handler"))
    }
}
