//! Error types for the tool registry.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found in the registry.
    #[error("Tool not found: {name}")]
    NotFound {
        /// Name of the tool that was not found.
        name: String,
    },

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {name}")]
    DuplicateName {
        /// Name of the duplicate tool.
        name: String,
    },

    /// The arguments provided to a tool were invalid.
    #[error("Invalid arguments for {name}: {message}")]
    InvalidArguments {
        /// Name of the tool with invalid arguments.
        name: String,
        /// Description of the validation failure.
        message: String,
    },
}

impl ToolError {
    /// Create a NotFound error for the given tool name.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a DuplicateName error for the given tool name.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create an InvalidArguments error.
    pub fn invalid_arguments(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = ToolError::not_found("missing_tool");
        assert!(error.to_string().contains("missing_tool"));
        assert!(error.to_string().contains("not found"));
    }

    #[test]
    fn test_duplicate_name_error() {
        let error = ToolError::duplicate_name("read_file");
        assert!(error.to_string().contains("read_file"));
        assert!(error.to_string().contains("already registered"));
    }

    #[test]
    fn test_invalid_arguments_error() {
        let error = ToolError::invalid_arguments("read_file", "missing required field 'path'");
        assert!(error.to_string().contains("read_file"));
        assert!(error.to_string().contains("missing required field"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToolError>();
    }
}
