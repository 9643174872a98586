//! # Crucible Models
//!
//! The three structured payloads that cross the pipeline boundary:
//! the validated initial request, the per-call request inside a parallel
//! batch, and the final structured deliverable.
//!
//! Parsing is always from serialized JSON text. A payload that does not
//! parse at all fails with `ToolError::MalformedInput`; one that parses
//! but is structurally incomplete fails with `ToolError::SchemaValidation`.
//! Validation has no side effects.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ToolError, ToolResult};

/// Schema for the initial user request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResearchQuery {
    /// The scientific topic or hypothesis to be investigated
    pub topic: String,
    /// The desired deliverable (e.g., "Draft full experimental protocol")
    pub target_output: String,
    /// Ordered core keywords for the literature search
    pub keywords: Vec<String>,
}

impl ResearchQuery {
    pub fn new(
        topic: impl Into<String>,
        target_output: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            target_output: target_output.into(),
            keywords,
        }
    }

    /// Parse and validate from serialized JSON text
    pub fn from_json(input: &str) -> ToolResult<Self> {
        let query: Self = serde_json::from_str(input).map_err(ToolError::from_json_error)?;
        query.validate()?;
        Ok(query)
    }

    /// Field-level checks beyond what deserialization enforces
    pub fn validate(&self) -> ToolResult<()> {
        if self.topic.trim().is_empty() {
            return Err(ToolError::SchemaValidation(
                "ResearchQuery.topic must be non-empty".to_string(),
            ));
        }
        if self.target_output.trim().is_empty() {
            return Err(ToolError::SchemaValidation(
                "ResearchQuery.target_output must be non-empty".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(ToolError::SchemaValidation(
                "ResearchQuery.keywords must be a non-empty list".to_string(),
            ));
        }
        Ok(())
    }
}

/// Schema for a single tool request within a multi-execute batch
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolExecutionRequest {
    /// Logical or router-native slug naming the tool to invoke
    pub tool_slug: String,
    /// Key-value arguments required by the tool's API
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolExecutionRequest {
    pub fn new(tool_slug: impl Into<String>) -> Self {
        Self {
            tool_slug: tool_slug.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// Parse a JSON array of requests
    pub fn list_from_json(input: &str) -> ToolResult<Vec<Self>> {
        serde_json::from_str(input).map_err(ToolError::from_json_error)
    }
}

/// Schema for the final published report, enforcing structured output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FinalSynthesis {
    /// The finalized, testable scientific hypothesis
    pub hypothesis: String,
    /// Brief summary of the proposed experimental steps
    pub protocol_summary: String,
    /// Core metrics and conclusions from the remote data analysis
    pub analysis_findings: String,
    /// URLs or workbench keys for key prior art documents (may be empty)
    pub prior_art_reference_links: Vec<String>,
    /// Recommended next steps for human researchers
    pub next_steps: String,
}

impl FinalSynthesis {
    /// Parse and validate from serialized JSON text
    pub fn from_json(input: &str) -> ToolResult<Self> {
        let synthesis: Self = serde_json::from_str(input).map_err(ToolError::from_json_error)?;
        synthesis.validate()?;
        Ok(synthesis)
    }

    /// All text fields must be non-empty; the links list may be empty
    pub fn validate(&self) -> ToolResult<()> {
        let required = [
            ("hypothesis", &self.hypothesis),
            ("protocol_summary", &self.protocol_summary),
            ("analysis_findings", &self.analysis_findings),
            ("next_steps", &self.next_steps),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ToolError::SchemaValidation(format!(
                    "FinalSynthesis.{field} must be non-empty"
                )));
            }
        }
        Ok(())
    }

    /// Field list quoted in publish rejection messages so a retrying
    /// caller can self-correct
    pub fn schema_hint() -> &'static str {
        "hypothesis, protocol_summary, analysis_findings, prior_art_reference_links, next_steps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_query_round_trip() {
        let input = r#"{"topic":"graphene quantum dots","target_output":"protocol","keywords":["graphene","delivery"]}"#;
        let query = ResearchQuery::from_json(input).unwrap();
        assert_eq!(query.topic, "graphene quantum dots");
        assert_eq!(query.keywords.len(), 2);
    }

    #[test]
    fn test_research_query_rejects_empty_keywords() {
        let input = r#"{"topic":"t","target_output":"o","keywords":[]}"#;
        let err = ResearchQuery::from_json(input).unwrap_err();
        assert!(matches!(err, ToolError::SchemaValidation(_)));
    }

    #[test]
    fn test_research_query_rejects_missing_field() {
        let input = r#"{"topic":"t","keywords":["k"]}"#;
        let err = ResearchQuery::from_json(input).unwrap_err();
        assert!(matches!(err, ToolError::SchemaValidation(_)));
    }

    #[test]
    fn test_research_query_malformed_is_distinct() {
        let err = ResearchQuery::from_json("{not json").unwrap_err();
        assert!(matches!(err, ToolError::MalformedInput(_)));
    }

    #[test]
    fn test_execution_request_defaults_arguments() {
        let list =
            ToolExecutionRequest::list_from_json(r#"[{"tool_slug":"ARXIV_SEARCH"}]"#).unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].arguments.is_empty());
    }

    #[test]
    fn test_final_synthesis_accepts_empty_links() {
        let input = r#"{
            "hypothesis": "h",
            "protocol_summary": "p",
            "analysis_findings": "a",
            "prior_art_reference_links": [],
            "next_steps": "n"
        }"#;
        assert!(FinalSynthesis::from_json(input).is_ok());
    }

    #[test]
    fn test_final_synthesis_rejects_blank_field() {
        let input = r#"{
            "hypothesis": "  ",
            "protocol_summary": "p",
            "analysis_findings": "a",
            "prior_art_reference_links": [],
            "next_steps": "n"
        }"#;
        let err = FinalSynthesis::from_json(input).unwrap_err();
        assert!(err.to_string().contains("hypothesis"));
    }

    #[test]
    fn test_final_synthesis_rejects_missing_links_field() {
        let input = r#"{
            "hypothesis": "h",
            "protocol_summary": "p",
            "analysis_findings": "a",
            "next_steps": "n"
        }"#;
        let err = FinalSynthesis::from_json(input).unwrap_err();
        assert!(matches!(err, ToolError::SchemaValidation(_)));
    }
}
