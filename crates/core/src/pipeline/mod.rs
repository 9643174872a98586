//! # Pipeline
//!
//! Fixed-order orchestration of the four tool stages.

pub mod events;
pub mod orchestrator;
pub mod stage;

pub use events::{PipelineEvent, PipelineEventKind};
pub use orchestrator::{Orchestrator, OrchestratorConfig, PipelineOutcome, StageRecord};
pub use stage::PipelineStage;
