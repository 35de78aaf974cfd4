//! The text protocol spoken with the model.
//!
//! The remote channel carries nothing but prompt text and rendered
//! response text, so function calling is emulated: the formatter
//! declares a single tagged call syntax in the system prompt, and the
//! parser recognizes exactly that syntax on the way back. Anything
//! outside the `<TOOL_CALL>` delimiter pair is free-form final-answer
//! text; anything malformed inside it is a fatal protocol violation.

pub mod formatter;
pub mod parser;
pub mod types;

pub use formatter::PromptFormatter;
pub use parser::{ProtocolError, ResponseParser};
pub use types::{Message, ParsedResponse, Role, ToolCall, ToolOutcome};
