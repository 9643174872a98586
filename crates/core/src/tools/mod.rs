//! # Tool Wrappers
//!
//! The four pipeline stages, one module each. Every stage exposes a
//! typed `run` function (used by the orchestrator) and a text-in /
//! text-out wrapper for the external reasoning-actor boundary.
//!
//! ## Modules
//!
//! - `slugs` - known-slug table with strict/permissive resolution
//! - `plan` - validate the research query, establish the session
//! - `research` - parallel data acquisition with workbench indirection
//! - `analysis` - retrieve workbench data, run the remote analysis script
//! - `publish` - validate the final synthesis, write the durable report
//!
//! The text wrappers never raise: every failure is flattened into a
//! single message prefixed with either `JSON Error:` (unparseable
//! input) or `CRITICAL TOOL ERROR:` (everything else), so an upstream
//! actor can detect failure by text pattern alone.

pub mod analysis;
pub mod plan;
pub mod publish;
pub mod research;
pub mod slugs;

use crate::error::ToolError;

/// Flatten a typed failure into the uniform wrapper error text
pub(crate) fn error_text(tool: &str, err: &ToolError) -> String {
    match err {
        ToolError::MalformedInput(detail) => {
            format!("JSON Error: the input to {tool} was not valid JSON. {detail}")
        }
        other => format!("CRITICAL TOOL ERROR: {tool} failed. {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_text_mentions_json() {
        let text = error_text(
            "CreateWorkflowPlan",
            &ToolError::MalformedInput("expected value at line 1".into()),
        );
        assert!(text.starts_with("JSON Error:"));
        assert!(text.contains("JSON"));
    }

    #[test]
    fn test_other_failures_use_critical_prefix() {
        let text = error_text(
            "RunRemoteDataAnalysis",
            &ToolError::Transport("connection refused".into()),
        );
        assert!(text.starts_with("CRITICAL TOOL ERROR:"));
        assert!(text.contains("RunRemoteDataAnalysis"));
    }
}
