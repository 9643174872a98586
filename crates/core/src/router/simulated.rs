//! # Simulated Router
//!
//! In-process stand-in for the remote tool router, used for demos and
//! tests. Owns session issuance and the workbench store, honors the
//! inline-size threshold, and executes batch items concurrently so
//! completion order genuinely differs from request order.
//!
//! A live backend (`HttpRouter`) can be swapped in without touching
//! anything above the `ToolRouter` seam.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::time::{Duration, Instant};

use super::{
    ExecutionBatchResult, ExecutionItemResult, ExecutionResult, ItemStatus, PlanResult,
    RouterConfig, SessionHandle, ToolRouter, Workbench, WorkbenchRequest, WorkbenchResult,
};
use crate::error::ToolResult;
use crate::models::ToolExecutionRequest;

/// Simulated tool router backend
pub struct SimulatedRouter {
    config: RouterConfig,
    workbench: Workbench,
}

impl SimulatedRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            workbench: Workbench::new(),
        }
    }

    /// Direct access to the store, for inspection in tests and demos
    pub fn workbench_store(&self) -> &Workbench {
        &self.workbench
    }

    /// Store the payload in the workbench when it exceeds the inline
    /// limit; otherwise return it inline
    fn place_output(
        &self,
        payload: serde_json::Value,
    ) -> ToolResult<(Option<String>, Option<serde_json::Value>)> {
        let serialized_len = serde_json::to_string(&payload)
            .map(|s| s.len())
            .unwrap_or(usize::MAX);
        if serialized_len > self.config.inline_result_limit {
            let key = self.workbench.store(None, payload)?;
            Ok((Some(key), None))
        } else {
            Ok((None, Some(payload)))
        }
    }

    async fn execute_one(&self, request: &ToolExecutionRequest) -> ExecutionItemResult {
        if self.config.simulate_latency {
            tokio::time::sleep(simulated_latency(&request.tool_slug)).await;
        }

        let query = request
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or("unspecified query");

        let (payload, summary_stem) = match request.tool_slug.as_str() {
            "arxiv.paper_search" => (
                arxiv_payload(query),
                "Found 5 highly relevant papers".to_string(),
            ),
            "pubchem.compound_query" => (
                pubchem_payload(query),
                "Retrieved 2 candidate chemical structures".to_string(),
            ),
            "notion.page_draft" => (
                json!({ "page_id": format!("page-{}", uuid::Uuid::new_v4()) }),
                "Drafted a report page".to_string(),
            ),
            other => {
                return ExecutionItemResult {
                    tool_slug: other.to_string(),
                    status: ItemStatus::Failed,
                    output_summary: "execution failed".to_string(),
                    workbench_key: None,
                    inline_output: None,
                    error: Some(format!("no simulated backend for tool slug: {other}")),
                };
            }
        };

        match self.place_output(payload) {
            Ok((workbench_key, inline_output)) => {
                let location = if workbench_key.is_some() {
                    "Raw data stored in workbench."
                } else {
                    "Result returned inline."
                };
                ExecutionItemResult {
                    tool_slug: request.tool_slug.clone(),
                    status: ItemStatus::Completed,
                    output_summary: format!("{summary_stem}. {location}"),
                    workbench_key,
                    inline_output,
                    error: None,
                }
            }
            Err(e) => ExecutionItemResult {
                tool_slug: request.tool_slug.clone(),
                status: ItemStatus::Failed,
                output_summary: "execution failed".to_string(),
                workbench_key: None,
                inline_output: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl Default for SimulatedRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[async_trait]
impl ToolRouter for SimulatedRouter {
    async fn create_plan(
        &self,
        use_case: &str,
        primary_slugs: &[String],
    ) -> ToolResult<PlanResult> {
        let session = SessionHandle::mint();
        tracing::info!(session_id = %session, "create_plan: {use_case}");

        let search_tools = match primary_slugs {
            [] => "the registered search tools".to_string(),
            [only] => only.clone(),
            [first, rest @ ..] => format!("{} and {}", first, rest.join(", ")),
        };

        Ok(PlanResult {
            session,
            complexity: "Hard (requires multi-stage orchestration and large result processing)."
                .to_string(),
            workflow_steps: vec![
                format!("1. Literature review (parallel search using {search_tools})"),
                "2. Store raw results in the remote workbench.".to_string(),
                "3. Execute analysis code remotely for data cleaning and initial screening."
                    .to_string(),
                "4. Draft final hypothesis and protocol.".to_string(),
                "5. Publish the report to the durable sink.".to_string(),
            ],
            reasoning:
                "The use case requires orchestration across research tools and a remote execution environment."
                    .to_string(),
        })
    }

    async fn multi_execute(
        &self,
        requests: &[ToolExecutionRequest],
        session: &SessionHandle,
    ) -> ToolResult<ExecutionBatchResult> {
        tracing::info!(
            session_id = %session,
            count = requests.len(),
            "multi_execute: dispatching batch"
        );

        // join_all preserves input order even though items complete
        // at different times
        let results = join_all(requests.iter().map(|req| self.execute_one(req))).await;

        Ok(ExecutionBatchResult {
            successful: true,
            session_id: session.id().to_string(),
            results,
        })
    }

    async fn workbench(&self, request: WorkbenchRequest) -> ToolResult<WorkbenchResult> {
        match request {
            WorkbenchRequest::Store { key, value } => {
                let key = self.workbench.store(key, value)?;
                tracing::info!(%key, "workbench: stored payload");
                Ok(WorkbenchResult { key, value: None })
            }
            WorkbenchRequest::Retrieve { key } => {
                let value = self.workbench.retrieve(&key)?;
                tracing::info!(%key, "workbench: retrieved payload");
                Ok(WorkbenchResult {
                    key,
                    value: Some(value),
                })
            }
        }
    }

    async fn remote_execute(&self, script: &str) -> ToolResult<ExecutionResult> {
        let started = Instant::now();
        tracing::info!(script_len = script.len(), "remote_execute: running script");

        if script.trim().is_empty() {
            return Ok(ExecutionResult {
                successful: false,
                stdout: String::new(),
                stderr: "refusing to execute an empty script".to_string(),
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        let analysis_output = json!({
            "final_clean_compounds": 3,
            "critical_risk_flag": false,
            "summary": "Data cleaning complete. Identified 3 high-potential compounds that passed initial risk filtering."
        });

        Ok(ExecutionResult {
            successful: true,
            stdout: analysis_output.to_string(),
            stderr: String::new(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Per-tool latency so batch items finish out of request order
fn simulated_latency(slug: &str) -> Duration {
    match slug {
        "arxiv.paper_search" => Duration::from_millis(12),
        "pubchem.compound_query" => Duration::from_millis(3),
        "notion.page_draft" => Duration::from_millis(6),
        _ => Duration::from_millis(1),
    }
}

fn arxiv_payload(query: &str) -> serde_json::Value {
    let papers: Vec<serde_json::Value> = (1..=5)
        .map(|n| {
            json!({
                "id": format!("arxiv:{n:04}.{n:05}"),
                "title": format!("Study {n} on {query}"),
                "abstract": filler_text(query, 8),
            })
        })
        .collect();
    json!({ "query": query, "papers": papers })
}

fn pubchem_payload(query: &str) -> serde_json::Value {
    let compounds: Vec<serde_json::Value> = (1..=2)
        .map(|n| {
            json!({
                "cid": 100_000 + n,
                "name": format!("candidate-compound-{n}"),
                "smiles": "C1=CC=C(C=C1)C(=O)O",
                "assay_notes": filler_text(query, 10),
            })
        })
        .collect();
    json!({ "query": query, "compounds": compounds })
}

/// Deterministic bulk text standing in for the large raw payloads a
/// real search tool returns
fn filler_text(query: &str, sentences: usize) -> String {
    format!(
        "Structured experimental observations relating to {query}, including measurement context, controls, and instrument metadata. "
    )
    .repeat(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;

    fn search_requests() -> Vec<ToolExecutionRequest> {
        vec![
            ToolExecutionRequest::new("arxiv.paper_search")
                .with_argument("query", json!("graphene quantum dots")),
            ToolExecutionRequest::new("pubchem.compound_query")
                .with_argument("query", json!("graphene quantum dots")),
        ]
    }

    #[tokio::test]
    async fn test_plan_mints_session_and_steps() {
        let router = SimulatedRouter::default();
        let plan = router
            .create_plan(
                "test use case",
                &["arxiv.paper_search".to_string(), "pubchem.compound_query".to_string()],
            )
            .await
            .unwrap();
        assert!(plan.session.id().starts_with("sess-"));
        assert!(!plan.workflow_steps.is_empty());
        assert!(plan.workflow_steps[0].contains("arxiv.paper_search"));
    }

    #[tokio::test]
    async fn test_batch_slots_align_to_request_order() {
        let router = SimulatedRouter::default();
        let session = SessionHandle::mint();

        // arxiv is the slowest simulated tool; putting it first means
        // it completes last, yet its slot must stay first
        let requests = search_requests();
        let batch = router.multi_execute(&requests, &session).await.unwrap();

        assert!(batch.successful);
        assert_eq!(batch.results.len(), requests.len());
        assert_eq!(batch.results[0].tool_slug, "arxiv.paper_search");
        assert_eq!(batch.results[1].tool_slug, "pubchem.compound_query");
    }

    #[tokio::test]
    async fn test_large_outputs_go_to_workbench() {
        let router = SimulatedRouter::default();
        let session = SessionHandle::mint();
        let batch = router
            .multi_execute(&search_requests(), &session)
            .await
            .unwrap();

        for slot in &batch.results {
            assert_eq!(slot.status, ItemStatus::Completed);
            let key = slot.workbench_key.as_ref().expect("indirect result");
            assert!(key.starts_with("wb-"));
            assert!(slot.inline_output.is_none());
            router
                .workbench(WorkbenchRequest::Retrieve { key: key.clone() })
                .await
                .unwrap();
        }
        assert_eq!(router.workbench_store().len(), batch.results.len());
    }

    #[tokio::test]
    async fn test_small_outputs_stay_inline() {
        let router = SimulatedRouter::new(RouterConfig {
            inline_result_limit: 1024 * 1024,
            ..RouterConfig::default()
        });
        let session = SessionHandle::mint();
        let batch = router
            .multi_execute(&search_requests(), &session)
            .await
            .unwrap();

        for slot in &batch.results {
            assert!(slot.workbench_key.is_none());
            assert!(slot.inline_output.is_some());
        }
    }

    #[tokio::test]
    async fn test_one_failing_item_does_not_abort_batch() {
        let router = SimulatedRouter::default();
        let session = SessionHandle::mint();
        let requests = vec![
            ToolExecutionRequest::new("no.such_tool"),
            ToolExecutionRequest::new("pubchem.compound_query").with_argument("query", json!("q")),
        ];
        let batch = router.multi_execute(&requests, &session).await.unwrap();

        assert!(batch.successful);
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].status, ItemStatus::Failed);
        assert!(batch.results[0].error.as_deref().unwrap().contains("no.such_tool"));
        assert_eq!(batch.results[1].status, ItemStatus::Completed);
    }

    #[tokio::test]
    async fn test_workbench_round_trip_through_router() {
        let router = SimulatedRouter::default();
        let value = json!({"large": "payload"});
        let stored = router
            .workbench(WorkbenchRequest::Store {
                key: None,
                value: value.clone(),
            })
            .await
            .unwrap();

        let retrieved = router
            .workbench(WorkbenchRequest::Retrieve { key: stored.key })
            .await
            .unwrap();
        assert_eq!(retrieved.value, Some(value));
    }

    #[tokio::test]
    async fn test_workbench_unknown_key() {
        let router = SimulatedRouter::default();
        let err = router
            .workbench(WorkbenchRequest::Retrieve {
                key: "wb-never".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn test_remote_execute_reports_analysis_json() {
        let router = SimulatedRouter::default();
        let result = router
            .remote_execute("analyze_workbench(keys=[\"wb-1\"])")
            .await
            .unwrap();
        assert!(result.successful);
        let parsed: serde_json::Value = serde_json::from_str(&result.stdout).unwrap();
        assert_eq!(parsed["final_clean_compounds"], 3);
    }

    #[tokio::test]
    async fn test_remote_execute_empty_script_fails_softly() {
        let router = SimulatedRouter::default();
        let result = router.remote_execute("   ").await.unwrap();
        assert!(!result.successful);
        assert!(result.stderr.contains("empty script"));
    }
}
