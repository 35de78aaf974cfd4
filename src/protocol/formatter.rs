//! Prompt rendering for the text-only tool-calling protocol.
//!
//! The transport has no structured message API, so the entire
//! conversation is rendered into one prompt string every iteration.
//! Rendering must be deterministic: the same message list always
//! yields byte-identical output.

use crate::protocol::types::{Message, ToolOutcome};
use crate::registry::ToolDefinition;

/// Separator between rendered messages.
const MESSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Renders system instructions, conversation history, and tool results
/// into the plain-text protocol the model is instructed to follow.
///
/// Stateless and shareable across concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct PromptFormatter;

impl PromptFormatter {
    /// Create a formatter.
    pub fn new() -> Self {
        Self
    }

    /// Build the system prompt: tool catalog plus the exact call syntax
    /// and behavioral rules the model must follow.
    pub fn format_system_prompt(&self, tools: &[ToolDefinition]) -> String {
        format!(
            "You are a helpful AI assistant with access to the following tools:\n\n\
{}\n\n\
When you need to use a tool, respond in this exact format:\n\
<TOOL_CALL>\n\
{{\n\
  \"tool\": \"tool_name\",\n\
  \"args\": {{\"param1\": \"value1\"}},\n\
  \"reasoning\": \"Why you're calling this tool\"\n\
}}\n\
</TOOL_CALL>\n\n\
Rules:\n\
- Use tools only when you need information you don't have\n\
- Provide clear reasoning for tool calls\n\
- After receiving tool results, analyze them and provide the final answer\n\
- If you have enough information, provide the final answer without more tool calls\n\
- Only use ONE tool call per response",
            self.format_tool_definitions(tools)
        )
    }

    /// Render the tool catalog: one block per tool with a line per
    /// schema property (type, required marker, description).
    pub fn format_tool_definitions(&self, tools: &[ToolDefinition]) -> String {
        if tools.is_empty() {
            return "No tools available.".to_string();
        }

        tools
            .iter()
            .map(|tool| {
                let required: Vec<&str> = tool
                    .parameters
                    .get("required")
                    .and_then(|r| r.as_array())
                    .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
                    .unwrap_or_default();

                let params = tool
                    .parameters
                    .get("properties")
                    .and_then(|p| p.as_object())
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, schema)| {
                                let kind = schema
                                    .get("type")
                                    .and_then(|t| t.as_str())
                                    .unwrap_or("any");
                                let description = schema
                                    .get("description")
                                    .and_then(|d| d.as_str())
                                    .unwrap_or("");
                                let marker = if required.contains(&name.as_str()) {
                                    " (required)"
                                } else {
                                    ""
                                };
                                format!("    - {}: {}{} - {}", name, kind, marker, description)
                            })
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();

                if params.is_empty() {
                    format!("- {}: {}", tool.name, tool.description)
                } else {
                    format!(
                        "- {}: {}\n  Parameters:\n{}",
                        tool.name, tool.description, params
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render the full conversation, each message prefixed with its
    /// upper-case role label. Order-preserving and idempotent.
    pub fn format_conversation(&self, messages: &[Message]) -> String {
        messages
            .iter()
            .map(|msg| format!("{}:\n{}", msg.role.label(), msg.content))
            .collect::<Vec<_>>()
            .join(MESSAGE_SEPARATOR)
    }

    /// Render a tool outcome as the labeled block appended back into
    /// history as a tool message. String payloads are included verbatim;
    /// structured payloads are pretty-printed.
    pub fn format_tool_result(&self, outcome: &ToolOutcome) -> String {
        if outcome.success {
            let payload = match &outcome.data {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => {
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                }
                None => String::new(),
            };
            format!("TOOL_RESULT: Tool executed successfully\n{}", payload)
        } else {
            format!(
                "TOOL_RESULT: Tool execution failed\nError: {}",
                outcome.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}
