//! # Parallel Research Stage
//!
//! Second stage: resolve each request's slug, fan the batch out through
//! multi-execute, and surface every workbench key the router produced.
//! The rendered text keeps the key list as a delimited JSON array so it
//! is both human-readable and machine-extractable from the same string.

use crate::error::{ToolError, ToolResult};
use crate::models::ToolExecutionRequest;
use crate::router::{ExecutionBatchResult, ItemStatus, SessionHandle, ToolRouter};
use crate::tools::slugs::{self, SlugPolicy};

const TOOL_NAME: &str = "ExecuteParallelResearch";

/// Typed output of the research stage
#[derive(Debug, Clone)]
pub struct ResearchOutput {
    pub batch: ExecutionBatchResult,
    /// Every workbench key produced, in slot order
    pub workbench_keys: Vec<String>,
}

impl ResearchOutput {
    /// Text view for the external boundary
    pub fn render(&self) -> String {
        let keys_json =
            serde_json::to_string(&self.workbench_keys).unwrap_or_else(|_| "[]".to_string());
        let summaries: Vec<String> = self
            .batch
            .results
            .iter()
            .map(|slot| match slot.status {
                ItemStatus::Completed => format!("{}: {}", slot.tool_slug, slot.output_summary),
                ItemStatus::Failed => format!(
                    "{}: FAILED ({})",
                    slot.tool_slug,
                    slot.error.as_deref().unwrap_or("unknown error")
                ),
            })
            .collect();
        format!(
            "Parallel execution successful. Workbench keys (JSON list): {}. Summary: {}",
            keys_json,
            summaries.join(" | ")
        )
    }
}

/// Resolve slugs per policy and run the batch
pub async fn run(
    router: &dyn ToolRouter,
    session: &SessionHandle,
    requests: &[ToolExecutionRequest],
    policy: SlugPolicy,
) -> ToolResult<ResearchOutput> {
    let mut resolved = Vec::with_capacity(requests.len());
    for request in requests {
        let native = slugs::resolve(&request.tool_slug, policy)?;
        resolved.push(ToolExecutionRequest {
            tool_slug: native,
            arguments: request.arguments.clone(),
        });
    }

    let batch = router.multi_execute(&resolved, session).await?;
    if !batch.successful {
        return Err(ToolError::Application(
            "multi-execute batch could not complete".to_string(),
        ));
    }

    let workbench_keys = batch
        .results
        .iter()
        .filter_map(|slot| slot.workbench_key.clone())
        .collect();

    Ok(ResearchOutput {
        batch,
        workbench_keys,
    })
}

/// Text boundary: a session id plus a JSON array of
/// ToolExecutionRequest objects
pub async fn execute_parallel_research(
    router: &dyn ToolRouter,
    session_id: &str,
    requests_json: &str,
    policy: SlugPolicy,
) -> String {
    if session_id.trim().is_empty() {
        return super::error_text(
            TOOL_NAME,
            &ToolError::SchemaValidation("session id must be non-empty".to_string()),
        );
    }
    let requests = match ToolExecutionRequest::list_from_json(requests_json) {
        Ok(requests) => requests,
        Err(err) => return super::error_text(TOOL_NAME, &err),
    };

    let session = SessionHandle::from_id(session_id.trim());
    match run(router, &session, &requests, policy).await {
        Ok(output) => output.render(),
        Err(err) => super::error_text(TOOL_NAME, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::SimulatedRouter;
    use crate::tools::slugs::{ARXIV_SEARCH, PUBCHEM_QUERY};
    use serde_json::json;

    fn requests_json() -> String {
        json!([
            { "tool_slug": ARXIV_SEARCH, "arguments": { "query": "graphene quantum dots" } },
            { "tool_slug": PUBCHEM_QUERY, "arguments": { "query": "graphene quantum dots" } },
        ])
        .to_string()
    }

    /// Pull the JSON key list back out of the rendered text the way a
    /// downstream caller would
    fn extract_keys(text: &str) -> Vec<String> {
        let marker = "Workbench keys (JSON list): ";
        let start = text.find(marker).expect("marker present") + marker.len();
        let end = text[start..].find(". Summary:").expect("delimiter present") + start;
        serde_json::from_str(&text[start..end]).expect("key list parses")
    }

    #[tokio::test]
    async fn test_two_requests_yield_two_keys() {
        let router = SimulatedRouter::default();
        let text = execute_parallel_research(
            &router,
            "sess-test",
            &requests_json(),
            SlugPolicy::Permissive,
        )
        .await;

        let keys = extract_keys(&text);
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("wb-")));
        assert!(text.contains("Summary:"));
    }

    #[tokio::test]
    async fn test_malformed_requests_json() {
        let router = SimulatedRouter::default();
        let text =
            execute_parallel_research(&router, "sess-test", "[{", SlugPolicy::Permissive).await;
        assert!(text.contains("JSON"));
    }

    #[tokio::test]
    async fn test_empty_session_id_rejected() {
        let router = SimulatedRouter::default();
        let text =
            execute_parallel_research(&router, "  ", &requests_json(), SlugPolicy::Permissive)
                .await;
        assert!(text.starts_with("CRITICAL TOOL ERROR:"));
        assert!(text.contains("session id"));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unknown_slug() {
        let router = SimulatedRouter::default();
        let input = json!([{ "tool_slug": "MYSTERY_TOOL" }]).to_string();
        let text =
            execute_parallel_research(&router, "sess-test", &input, SlugPolicy::Strict).await;
        assert!(text.starts_with("CRITICAL TOOL ERROR:"));
        assert!(text.contains("MYSTERY_TOOL"));
    }

    #[tokio::test]
    async fn test_permissive_policy_passes_unknown_slug_to_router() {
        let router = SimulatedRouter::default();
        let input = json!([{ "tool_slug": "MYSTERY_TOOL" }]).to_string();
        let text =
            execute_parallel_research(&router, "sess-test", &input, SlugPolicy::Permissive).await;
        // The router has no backend for it, so the slot fails, but the
        // batch itself still renders
        assert!(text.contains("Parallel execution successful"));
        assert!(text.contains("MYSTERY_TOOL: FAILED"));
    }

    #[tokio::test]
    async fn test_typed_run_preserves_slot_order() {
        let router = SimulatedRouter::default();
        let session = SessionHandle::mint();
        let requests = vec![
            ToolExecutionRequest::new(ARXIV_SEARCH).with_argument("query", json!("q")),
            ToolExecutionRequest::new(PUBCHEM_QUERY).with_argument("query", json!("q")),
        ];
        let output = run(&router, &session, &requests, SlugPolicy::Permissive)
            .await
            .unwrap();
        assert_eq!(output.batch.results[0].tool_slug, "arxiv.paper_search");
        assert_eq!(output.batch.results[1].tool_slug, "pubchem.compound_query");
        assert_eq!(output.workbench_keys.len(), 2);
    }
}
