//! # Remote Analysis Stage
//!
//! Third stage: pull the raw batch data back out of the workbench,
//! synthesize an analysis script referencing every retrieved key, and
//! run it remotely. The stage's text output is the script's stdout
//! verbatim - in practice a JSON object the final stage re-parses.

use crate::error::{ToolError, ToolResult};
use crate::router::{ExecutionResult, ToolRouter, WorkbenchRequest};

const TOOL_NAME: &str = "RunRemoteDataAnalysis";

/// Typed output of the analysis stage
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub execution: ExecutionResult,
    /// Keys whose data was retrieved before execution
    pub retrieved_keys: Vec<String>,
    /// Keys the workbench did not recognize (skipped, not fatal)
    pub missing_keys: Vec<String>,
}

impl AnalysisOutput {
    /// Text view for the external boundary: stdout verbatim
    pub fn render(&self) -> String {
        self.execution.stdout.clone()
    }
}

/// Retrieve each key independently, then execute the analysis script
pub async fn run(router: &dyn ToolRouter, keys: &[String]) -> ToolResult<AnalysisOutput> {
    let mut retrieved_keys = Vec::new();
    let mut missing_keys = Vec::new();

    for key in keys {
        match router
            .workbench(WorkbenchRequest::Retrieve { key: key.clone() })
            .await
        {
            Ok(_) => retrieved_keys.push(key.clone()),
            Err(ToolError::UnknownKey(key)) => {
                // One bad key must not abort the remaining retrievals
                tracing::warn!(%key, "workbench key not found, skipping");
                missing_keys.push(key);
            }
            Err(other) => return Err(other),
        }
    }

    if retrieved_keys.is_empty() {
        return Err(ToolError::Application(
            "no workbench data could be retrieved for analysis".to_string(),
        ));
    }

    let keys_json =
        serde_json::to_string(&retrieved_keys).unwrap_or_else(|_| "[]".to_string());
    let script = format!("analyze_workbench(keys={keys_json})");

    let execution = router.remote_execute(&script).await?;
    if !execution.successful {
        return Err(ToolError::Application(format!(
            "remote execution failed: {}",
            execution.stderr
        )));
    }

    Ok(AnalysisOutput {
        execution,
        retrieved_keys,
        missing_keys,
    })
}

/// Text boundary: input is a JSON array of workbench keys; output is
/// the remote script's stdout verbatim
pub async fn run_data_analysis(router: &dyn ToolRouter, workbench_keys_json: &str) -> String {
    let keys: Vec<String> = match serde_json::from_str(workbench_keys_json) {
        Ok(keys) => keys,
        Err(err) => return super::error_text(TOOL_NAME, &ToolError::from_json_error(err)),
    };
    match run(router, &keys).await {
        Ok(output) => output.render(),
        Err(err) => super::error_text(TOOL_NAME, &err),
    }
}
