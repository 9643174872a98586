//! # Pipeline Stages
//!
//! The fixed-order stages of the tool-invocation pipeline.

use serde::{Deserialize, Serialize};

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Validating the query and establishing a session
    Planning,
    /// Parallel data acquisition into the workbench
    Research,
    /// Remote analysis over workbench data
    Analysis,
    /// Validating and publishing the final synthesis
    Publishing,
    /// Complete
    Complete,
    /// Failed
    Failed,
}

impl PipelineStage {
    /// The next stage in fixed order; terminal stages stay put
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Planning => PipelineStage::Research,
            PipelineStage::Research => PipelineStage::Analysis,
            PipelineStage::Analysis => PipelineStage::Publishing,
            PipelineStage::Publishing => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed)
    }

    pub fn is_success(self) -> bool {
        self == PipelineStage::Complete
    }

    /// External tool name for this stage, used in error reporting
    pub fn tool_name(self) -> &'static str {
        match self {
            PipelineStage::Planning => "CreateWorkflowPlan",
            PipelineStage::Research => "ExecuteParallelResearch",
            PipelineStage::Analysis => "RunRemoteDataAnalysis",
            PipelineStage::Publishing => "PublishFinalReport",
            PipelineStage::Complete | PipelineStage::Failed => "Pipeline",
        }
    }
}
