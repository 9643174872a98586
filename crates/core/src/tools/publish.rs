//! # Publish Stage
//!
//! Final stage: validate the synthesis against the full field set, then
//! write it to the durable report sink. A validation rejection names
//! the expected schema so a retrying caller can self-correct.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{ToolError, ToolResult};
use crate::models::FinalSynthesis;
use crate::report;

const TOOL_NAME: &str = "PublishFinalReport";

/// Typed output of the publish stage
#[derive(Debug, Clone)]
pub struct PublishOutput {
    pub report_id: String,
    pub report_path: PathBuf,
}

impl PublishOutput {
    /// Text view for the external boundary
    pub fn render(&self) -> String {
        format!(
            "Final synthesis published successfully. Report ID: {}. Saved to {}.",
            self.report_id,
            self.report_path.display()
        )
    }
}

/// Validate and publish a synthesis to the report sink
pub async fn run(report_dir: &Path, synthesis: &FinalSynthesis) -> ToolResult<PublishOutput> {
    synthesis.validate()?;

    let report_id = format!("rpt-{}", Uuid::new_v4());
    let report_path = report::write_report(report_dir, &report_id, synthesis)
        .await
        .map_err(|e| ToolError::Transport(format!("report sink unavailable: {e}")))?;

    tracing::info!(%report_id, path = %report_path.display(), "report published");
    Ok(PublishOutput {
        report_id,
        report_path,
    })
}

/// Text boundary: input must be a JSON string of the FinalSynthesis
/// schema
pub async fn publish_final_report(report_dir: &Path, synthesis_json: &str) -> String {
    let synthesis = match FinalSynthesis::from_json(synthesis_json) {
        Ok(synthesis) => synthesis,
        Err(err @ ToolError::SchemaValidation(_)) => {
            return format!(
                "CRITICAL TOOL ERROR: {TOOL_NAME} rejected the payload. {err} \
                 Expected FinalSynthesis fields: {}.",
                FinalSynthesis::schema_hint()
            );
        }
        Err(err) => return super::error_text(TOOL_NAME, &err),
    };
    match run(report_dir, &synthesis).await {
        Ok(output) => output.render(),
        Err(err) => super::error_text(TOOL_NAME, &err),
    }
}
