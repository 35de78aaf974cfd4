//! Strict classification of raw model output.
//!
//! A turn either contains exactly one `<TOOL_CALL>` block (a structured
//! request) or it is the final answer. A present-but-malformed block is
//! a protocol violation that aborts the run; guessing at intent would
//! mask model misbehavior.

use crate::protocol::types::{ParsedResponse, ToolCall};
use regex::Regex;
use thiserror::Error;

/// Regex for the single recognized delimiter pair. `(?s)` so the JSON
/// body may span lines; non-greedy so trailing text cannot absorb a
/// second closing tag.
const TOOL_CALL_PATTERN: &str = r"(?s)<TOOL_CALL>(.*?)</TOOL_CALL>";

/// Protocol violations in model output.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The delimiter pair was present but its body was not valid JSON.
    #[error("Failed to parse tool call JSON: {message}")]
    MalformedJson {
        /// Underlying JSON error description.
        message: String,
        /// Raw content between the delimiters, for diagnostics.
        raw: String,
    },

    /// The JSON object was missing a required field or had the wrong type.
    #[error("Failed to parse tool call JSON: {message}")]
    InvalidStructure {
        /// Which constraint was violated.
        message: String,
    },

    /// A parsed call failed validation.
    #[error("Invalid tool call: {message}")]
    InvalidCall {
        /// Which constraint was violated.
        message: String,
    },
}

impl ProtocolError {
    /// Create an InvalidStructure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Create an InvalidCall error.
    pub fn invalid_call(message: impl Into<String>) -> Self {
        Self::InvalidCall {
            message: message.into(),
        }
    }
}

/// Parses raw model output into a final answer or a tool call.
///
/// Stateless apart from the compiled pattern; shareable across runs.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    call_re: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self {
            // The pattern is a compile-time constant; failure here is a bug.
            call_re: Regex::new(TOOL_CALL_PATTERN).expect("tool call pattern compiles"),
        }
    }

    /// Classify a raw model turn.
    ///
    /// No delimiter pair means the whole trimmed output is the final
    /// answer. A present pair must contain a well-formed call or the
    /// turn is a protocol violation.
    pub fn parse(&self, response: &str) -> Result<ParsedResponse, ProtocolError> {
        match self.extract(response)? {
            Some(call) => Ok(ParsedResponse::ToolCall(call)),
            None => Ok(ParsedResponse::Text(response.trim().to_string())),
        }
    }

    /// Extract a tool call from the delimiter block, if one is present.
    pub fn extract(&self, response: &str) -> Result<Option<ToolCall>, ProtocolError> {
        let captures = match self.call_re.captures(response) {
            Some(c) => c,
            None => return Ok(None),
        };

        let raw = captures
            .get(1)
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::MalformedJson {
                message: e.to_string(),
                raw: raw.to_string(),
            })?;

        let object = value
            .as_object()
            .ok_or_else(|| ProtocolError::invalid_structure("tool call must be a JSON object"))?;

        let tool = object
            .get("tool")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ProtocolError::invalid_structure("missing or invalid \"tool\" field"))?
            .to_string();

        let args = object
            .get("args")
            .and_then(|a| a.as_object())
            .ok_or_else(|| ProtocolError::invalid_structure("missing or invalid \"args\" field"))?
            .clone();

        let reasoning = object
            .get("reasoning")
            .and_then(|r| r.as_str())
            .map(|r| r.to_string());

        Ok(Some(ToolCall {
            tool,
            args,
            reasoning,
        }))
    }

    /// Validate a parsed tool call.
    ///
    /// The parser already enforces structure; this re-checks the
    /// constraints the orchestrator relies on and names the violated
    /// one verbatim.
    pub fn validate(&self, call: &ToolCall) -> Result<(), ProtocolError> {
        if call.tool.trim().is_empty() {
            return Err(ProtocolError::invalid_call(
                "Tool name must be a non-empty string",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_classified_verbatim() {
        let parser = ResponseParser::new();
        let parsed = parser.parse("  The file is empty.  \n").unwrap();

        assert_eq!(
            parsed,
            ParsedResponse::Text("The file is empty.".to_string())
        );
    }

    #[test]
    fn test_well_formed_call_extracted() {
        let parser = ResponseParser::new();
        let response = r#"<TOOL_CALL>
{
  "tool": "read_file",
  "args": {"path": "config.json"},
  "reasoning": "Need the file contents"
}
</TOOL_CALL>"#;

        let parsed = parser.parse(response).unwrap();
        match parsed {
            ParsedResponse::ToolCall(call) => {
                assert_eq!(call.tool, "read_file");
                assert_eq!(call.args.get("path"), Some(&json!("config.json")));
                assert_eq!(call.reasoning.as_deref(), Some("Need the file contents"));
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }

    #[test]
    fn test_call_with_surrounding_prose() {
        let parser = ResponseParser::new();
        let response = "I'll check the file first.\n<TOOL_CALL>{\"tool\": \"read_file\", \"args\": {\"path\": \"a\"}}</TOOL_CALL>\nBack soon.";

        let parsed = parser.parse(response).unwrap();
        assert!(matches!(parsed, ParsedResponse::ToolCall(_)));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let parser = ResponseParser::new();
        let response = "<TOOL_CALL>{not json}</TOOL_CALL>";

        let err = parser.parse(response).unwrap_err();
        assert!(err.to_string().contains("Failed to parse tool call JSON"));
    }

    #[test]
    fn test_missing_tool_field_is_fatal() {
        let parser = ResponseParser::new();
        let response = r#"<TOOL_CALL>{"args": {}}</TOOL_CALL>"#;

        let err = parser.parse(response).unwrap_err();
        assert!(err.to_string().contains("\"tool\""));
    }

    #[test]
    fn test_array_args_is_fatal() {
        let parser = ResponseParser::new();
        let response = r#"<TOOL_CALL>{"tool": "read_file", "args": [1, 2]}</TOOL_CALL>"#;

        let err = parser.parse(response).unwrap_err();
        assert!(err.to_string().contains("\"args\""));
    }

    #[test]
    fn test_null_args_is_fatal() {
        let parser = ResponseParser::new();
        let response = r#"<TOOL_CALL>{"tool": "read_file", "args": null}</TOOL_CALL>"#;

        assert!(parser.parse(response).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let parser = ResponseParser::new();
        let call = ToolCall {
            tool: "  ".to_string(),
            args: serde_json::Map::new(),
            reasoning: None,
        };

        let err = parser.validate(&call).unwrap_err();
        assert!(err.to_string().contains("non-empty string"));
    }

    #[test]
    fn test_non_greedy_body_match() {
        let parser = ResponseParser::new();
        let response = "<TOOL_CALL>{\"tool\": \"a\", \"args\": {}}</TOOL_CALL> trailing </TOOL_CALL>";

        let call = parser.extract(response).unwrap().unwrap();
        assert_eq!(call.tool, "a");
    }
}
