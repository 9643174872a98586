//! # Error Taxonomy
//!
//! Typed failure kinds for the tool-invocation pipeline.
//!
//! Only `Transport` means "the tool router could not be reached at all";
//! everything else is an application-level outcome the caller inspects
//! and reports upward as text. The text wrappers in `tools/` are the one
//! place these values are flattened into strings - no error value crosses
//! that boundary.

use thiserror::Error;

/// Failure kinds for router calls and payload validation
#[derive(Debug, Error)]
pub enum ToolError {
    /// Input text was not parseable as JSON at all
    #[error("input was not valid JSON: {0}")]
    MalformedInput(String),

    /// Parsed, but required fields are missing or mistyped
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// Retrieve against a workbench key that was never stored
    #[error("unknown workbench key: {0}")]
    UnknownKey(String),

    /// The tool router was unreachable or rejected the call outright
    #[error("tool router transport failure: {0}")]
    Transport(String),

    /// A well-formed call the remote tool legitimately could not satisfy
    #[error("tool application failure: {0}")]
    Application(String),
}

impl ToolError {
    /// Classify a serde_json error: syntax/EOF problems are malformed
    /// input, data problems (missing/mistyped fields) are schema
    /// validation failures.
    pub fn from_json_error(err: serde_json::Error) -> Self {
        if err.is_data() {
            ToolError::SchemaValidation(err.to_string())
        } else {
            ToolError::MalformedInput(err.to_string())
        }
    }

    /// Whether this failure is transport-level (the only kind that
    /// aborts a whole batch)
    pub fn is_transport(&self) -> bool {
        matches!(self, ToolError::Transport(_))
    }
}

/// Convenience alias used throughout the crate
pub type ToolResult<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Probe {
        name: String,
    }

    #[test]
    fn test_syntax_error_is_malformed_input() {
        let err = serde_json::from_str::<Probe>("not json {{{").unwrap_err();
        let tool_err = ToolError::from_json_error(err);
        assert!(matches!(tool_err, ToolError::MalformedInput(_)));
        assert!(tool_err.to_string().contains("JSON"));
    }

    #[test]
    fn test_missing_field_is_schema_validation() {
        let err = serde_json::from_str::<Probe>("{}").unwrap_err();
        let tool_err = ToolError::from_json_error(err);
        assert!(matches!(tool_err, ToolError::SchemaValidation(_)));
    }

    #[test]
    fn test_transport_classification() {
        assert!(ToolError::Transport("connection refused".into()).is_transport());
        assert!(!ToolError::UnknownKey("wb-missing".into()).is_transport());
    }
}
