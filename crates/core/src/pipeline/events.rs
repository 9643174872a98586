//! # Pipeline Events
//!
//! Progress events emitted while a run advances through its stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::PipelineStage;

/// Kind of pipeline event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventKind {
    /// Run started
    PipelineStarted,
    /// A stage began
    StageStarted,
    /// A stage finished successfully
    StageCompleted,
    /// A stage failed; the run halts after this
    StageFailed,
    /// Run finished successfully
    PipelineCompleted,
    /// Run halted on a stage failure
    PipelineFailed,
}

/// An event in a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: PipelineEventKind,
    /// Stage the event belongs to
    pub stage: PipelineStage,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PipelineEvent {
    /// Create a new event
    pub fn new(kind: PipelineEventKind, stage: PipelineStage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind,
            stage,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = PipelineEvent::new(PipelineEventKind::StageStarted, PipelineStage::Planning)
            .with_data(json!({"topic": "graphene"}));

        assert_eq!(event.kind, PipelineEventKind::StageStarted);
        assert_eq!(event.stage, PipelineStage::Planning);
        assert!(event.data.is_some());
        assert!(!event.id.is_empty());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = PipelineEvent::new(PipelineEventKind::PipelineStarted, PipelineStage::Planning);
        let b = PipelineEvent::new(PipelineEventKind::PipelineStarted, PipelineStage::Planning);
        assert_ne!(a.id, b.id);
    }
}
