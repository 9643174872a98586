//! # Tool Router Client
//!
//! The boundary to the remote tool router: plan creation, parallel
//! multi-execution, workbench store/retrieve, and remote script
//! execution. The router exclusively owns session issuance and the
//! workbench store.
//!
//! ## Modules
//!
//! - `simulated` - in-process stand-in used for demos and tests
//! - `http` - reqwest-backed client for a live router service
//! - `workbench` - the large-payload indirection store
//!
//! Transport-level failure (the router cannot be reached at all) is the
//! only condition surfaced as `ToolError::Transport`; application-level
//! failure is returned inside the result structures for the caller to
//! inspect.

pub mod http;
pub mod simulated;
pub mod workbench;

pub use http::HttpRouter;
pub use simulated::SimulatedRouter;
pub use workbench::Workbench;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ToolResult;
use crate::models::ToolExecutionRequest;

/// Opaque identifier binding all stages of one pipeline run.
///
/// Stable once issued; stages 2-3 must present it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Mint a fresh, collision-free handle
    pub fn mint() -> Self {
        Self(format!("sess-{}", Uuid::new_v4()))
    }

    /// Wrap an id received from outside (e.g. extracted from stage text)
    pub fn from_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of plan creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    /// Newly minted session for this pipeline run
    pub session: SessionHandle,
    /// Complexity label for the use case
    pub complexity: String,
    /// Ordered, human-readable workflow step descriptions
    pub workflow_steps: Vec<String>,
    /// Router's rationale for the plan shape
    pub reasoning: String,
}

/// Per-item completion status within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Completed,
    Failed,
}

/// One result slot of a multi-execute batch.
///
/// Slots are positionally aligned to the caller's request order, not
/// completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionItemResult {
    /// Router-native slug the request resolved to
    pub tool_slug: String,
    pub status: ItemStatus,
    /// Short human-readable description of what happened
    pub output_summary: String,
    /// Set when the output exceeded the inline limit and went to the workbench
    #[serde(default)]
    pub workbench_key: Option<String>,
    /// Set when the output fit inline
    #[serde(default)]
    pub inline_output: Option<serde_json::Value>,
    /// Set when this slot failed
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a multi-execute batch call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionBatchResult {
    /// False only when the batch call itself could not complete;
    /// individual slot failures do not clear this flag
    pub successful: bool,
    pub session_id: String,
    /// Exactly one slot per request, in request order
    pub results: Vec<ExecutionItemResult>,
}

/// A workbench operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkbenchRequest {
    /// Store a value; a fresh key is minted when none is supplied
    Store {
        #[serde(default)]
        key: Option<String>,
        value: serde_json::Value,
    },
    /// Retrieve a previously stored value
    Retrieve { key: String },
}

/// Result of a workbench operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbenchResult {
    /// The key the operation addressed (minted on keyless store)
    pub key: String,
    /// The stored value; present on retrieve
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Result of a remote script execution.
///
/// A failed execution comes back with `successful == false` and
/// diagnostics in `stderr` rather than as an Err; callers must inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub successful: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

/// Tunables for a router instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Serialized outputs larger than this many bytes are stored in the
    /// workbench and returned by key instead of inline
    pub inline_result_limit: usize,
    /// Upper bound on a remote script execution; expiry is a transport failure
    pub exec_timeout_secs: u64,
    /// Whether the simulator adds small per-tool latency so batches
    /// genuinely complete out of input order
    pub simulate_latency: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            inline_result_limit: 2048,
            exec_timeout_secs: 120,
            simulate_latency: true,
        }
    }
}

/// The four remote operations every backend must expose.
///
/// A live backend can be swapped in for the simulator without changing
/// anything above this seam.
#[async_trait]
pub trait ToolRouter: Send + Sync {
    /// Create a multi-step execution plan and mint the run's session
    async fn create_plan(&self, use_case: &str, primary_slugs: &[String])
        -> ToolResult<PlanResult>;

    /// Execute all requests concurrently; result slots come back in
    /// request order regardless of completion order
    async fn multi_execute(
        &self,
        requests: &[ToolExecutionRequest],
        session: &SessionHandle,
    ) -> ToolResult<ExecutionBatchResult>;

    /// Store or retrieve a large payload by key
    async fn workbench(&self, request: WorkbenchRequest) -> ToolResult<WorkbenchResult>;

    /// Run an opaque script against previously retrieved workbench data
    async fn remote_execute(&self, script: &str) -> ToolResult<ExecutionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_handles_are_unique() {
        let a = SessionHandle::mint();
        let b = SessionHandle::mint();
        assert_ne!(a, b);
        assert!(a.id().starts_with("sess-"));
    }

    #[test]
    fn test_session_handle_serializes_as_plain_string() {
        let handle = SessionHandle::from_id("sess-fixed");
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"sess-fixed\"");
    }

    #[test]
    fn test_workbench_request_wire_shape() {
        let json = serde_json::to_value(WorkbenchRequest::Retrieve {
            key: "wb-1".to_string(),
        })
        .unwrap();
        assert_eq!(json["action"], "retrieve");
        assert_eq!(json["key"], "wb-1");
    }
}
