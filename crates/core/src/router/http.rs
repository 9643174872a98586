//! # HTTP Router
//!
//! reqwest-backed client for a live tool-router service. Speaks the
//! same result structures as the simulator, so swapping it in changes
//! nothing above the `ToolRouter` seam.
//!
//! Network errors and timeouts map to `ToolError::Transport`; HTTP
//! error statuses map to `Application` (or `UnknownKey` for a missing
//! workbench record) since the service itself answered.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use super::{
    ExecutionBatchResult, ExecutionResult, PlanResult, RouterConfig, SessionHandle, ToolRouter,
    WorkbenchRequest, WorkbenchResult,
};
use crate::error::{ToolError, ToolResult};
use crate::models::ToolExecutionRequest;

/// Live tool router backend
pub struct HttpRouter {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpRouter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        config: &RouterConfig,
    ) -> ToolResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.exec_timeout_secs))
            .build()
            .map_err(|e| ToolError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ToolResult<T> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ToolError::Transport(format!("POST {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(ToolError::Transport(format!("{url} returned {status}: {detail}")));
            }
            return Err(ToolError::Application(format!(
                "{url} returned {status}: {detail}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ToolError::Transport(format!("decoding response from {url}: {e}")))
    }
}

#[async_trait]
impl ToolRouter for HttpRouter {
    async fn create_plan(
        &self,
        use_case: &str,
        primary_slugs: &[String],
    ) -> ToolResult<PlanResult> {
        self.post(
            "plans",
            &json!({
                "use_case": use_case,
                "primary_slugs": primary_slugs,
            }),
        )
        .await
    }

    async fn multi_execute(
        &self,
        requests: &[ToolExecutionRequest],
        session: &SessionHandle,
    ) -> ToolResult<ExecutionBatchResult> {
        self.post(
            "batches",
            &json!({
                "session_id": session.id(),
                "requests": requests,
            }),
        )
        .await
    }

    async fn workbench(&self, request: WorkbenchRequest) -> ToolResult<WorkbenchResult> {
        // A missing record is the one application failure with its own
        // taxonomy kind
        let retrieve_key = match &request {
            WorkbenchRequest::Retrieve { key } => Some(key.clone()),
            WorkbenchRequest::Store { .. } => None,
        };
        self.post("workbench", &request).await.map_err(|e| {
            if let (ToolError::Application(detail), Some(key)) = (&e, &retrieve_key) {
                if detail.contains("404") {
                    return ToolError::UnknownKey(key.clone());
                }
            }
            e
        })
    }

    async fn remote_execute(&self, script: &str) -> ToolResult<ExecutionResult> {
        self.post("exec", &json!({ "script": script })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let router =
            HttpRouter::new("https://router.example.com/", "key", &RouterConfig::default())
                .unwrap();
        assert_eq!(
            router.endpoint("plans"),
            "https://router.example.com/plans"
        );
    }

    #[tokio::test]
    async fn test_unreachable_router_is_transport_failure() {
        // Reserved TEST-NET address; nothing listens there
        let router = HttpRouter::new(
            "http://192.0.2.1:9",
            "key",
            &RouterConfig {
                exec_timeout_secs: 1,
                ..RouterConfig::default()
            },
        )
        .unwrap();
        let err = router.remote_execute("noop()").await.unwrap_err();
        assert!(err.is_transport());
    }
}
