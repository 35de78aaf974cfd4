//! Core wire types shared by the formatter, parser, and orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message in the conversation.
///
/// The role determines the label used when the conversation is rendered
/// into the single prompt string sent over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (tool catalog + calling convention).
    System,
    /// The caller's request.
    User,
    /// A raw model turn.
    Assistant,
    /// A formatted tool result fed back to the model.
    Tool,
}

impl Role {
    /// Upper-case label used when rendering the conversation.
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::Tool => "TOOL RESULT",
        }
    }
}

/// A single message in an orchestration run's conversation.
///
/// Messages are owned by exactly one run and appended strictly in order;
/// the whole ordered history is re-rendered and re-sent every iteration
/// because the transport is stateless between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a tool-result message.
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// A structured tool-call request parsed out of a model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke.
    pub tool: String,
    /// Arguments as a JSON object.
    pub args: Map<String, Value>,
    /// Optional model-supplied reasoning for the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ToolCall {
    /// Two calls are duplicates when they name the same tool with
    /// deep-equal arguments. Reasoning is ignored on purpose: a model
    /// that re-issues the same call with fresh justification is still
    /// looping.
    pub fn is_duplicate_of(&self, other: &ToolCall) -> bool {
        self.tool == other.tool && self.args == other.args
    }
}

/// Result reported by a tool handler.
///
/// `success == false` is terminal for the run: the orchestrator stops
/// instead of feeding the failure back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the handler considers the invocation successful.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Successful outcome with a payload.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed outcome with an error description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Whether this outcome should terminate the run.
    pub fn is_failure(&self) -> bool {
        !self.success || self.error.is_some()
    }
}

/// Classification of a raw model turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// Final answer: the entire trimmed output.
    Text(String),
    /// A structured tool-call request.
    ToolCall(ToolCall),
}

impl ParsedResponse {
    /// Short kind label for events and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedResponse::Text(_) => "text",
            ParsedResponse::ToolCall(_) => "tool_call",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(tool: &str, args: Value) -> ToolCall {
        ToolCall {
            tool: tool.to_string(),
            args: args.as_object().unwrap().clone(),
            reasoning: None,
        }
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::System.label(), "SYSTEM");
        assert_eq!(Role::Tool.label(), "TOOL RESULT");
    }

    #[test]
    fn test_duplicate_detection_ignores_reasoning() {
        let a = call("read_file", json!({"path": "a.txt"}));
        let mut b = call("read_file", json!({"path": "a.txt"}));
        b.reasoning = Some("checking again".to_string());

        assert!(a.is_duplicate_of(&b));
    }

    #[test]
    fn test_duplicate_detection_compares_args_deeply() {
        let a = call("read_file", json!({"path": "a.txt", "opts": {"n": 1}}));
        let b = call("read_file", json!({"path": "a.txt", "opts": {"n": 2}}));
        assert!(!a.is_duplicate_of(&b));

        let c = call("read_file", json!({"path": "a.txt", "opts": {"n": 1}}));
        assert!(a.is_duplicate_of(&c));
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = ToolOutcome::ok(json!("data"));
        assert!(ok.success);
        assert!(!ok.is_failure());

        let bad = ToolOutcome::failure("nope");
        assert!(!bad.success);
        assert!(bad.is_failure());
        assert_eq!(bad.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_outcome_error_implies_failure() {
        let odd = ToolOutcome {
            success: true,
            data: None,
            error: Some("partial".to_string()),
        };
        assert!(odd.is_failure());
    }

    #[test]
    fn test_tool_call_serde_roundtrip() {
        let original = ToolCall {
            tool: "read_file".to_string(),
            args: json!({"path": "config.json"}).as_object().unwrap().clone(),
            reasoning: Some("need the contents".to_string()),
        };

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: ToolCall = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
    }
}
