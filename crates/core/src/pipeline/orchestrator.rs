//! # Pipeline Orchestrator
//!
//! Runs the four stages in fixed order, threading each stage's typed
//! output into the next without losing the session handle or the
//! workbench key list. The first stage error halts the run - there is
//! no retry or compensation.
//!
//! The router is injected per run; nothing here holds ambient state
//! across runs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::events::{PipelineEvent, PipelineEventKind};
use super::stage::PipelineStage;
use crate::error::ToolError;
use crate::models::{FinalSynthesis, ResearchQuery, ToolExecutionRequest};
use crate::report;
use crate::router::ToolRouter;
use crate::tools;
use crate::tools::analysis::AnalysisOutput;
use crate::tools::plan::PlanOutput;
use crate::tools::slugs::{SlugPolicy, ARXIV_SEARCH, PUBCHEM_QUERY};

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How unregistered tool slugs are treated
    #[serde(default)]
    pub slug_policy: SlugPolicy,
    /// Directory the published report is written to
    pub report_dir: PathBuf,
    /// Logical slugs fanned out during the research stage
    pub primary_slugs: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            slug_policy: SlugPolicy::Permissive,
            report_dir: report::default_report_dir(),
            primary_slugs: vec![ARXIV_SEARCH.to_string(), PUBCHEM_QUERY.to_string()],
        }
    }
}

/// The rendered text a stage handed to its successor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub output: String,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report_id: String,
    /// The publish confirmation text
    pub confirmation: String,
    /// Per-stage text outputs, in stage order
    pub transcript: Vec<StageRecord>,
    /// Events that occurred
    pub events: Vec<PipelineEvent>,
    pub success: bool,
}

/// The pipeline orchestrator
pub struct Orchestrator {
    config: OrchestratorConfig,
    router: Arc<dyn ToolRouter>,
    stage: PipelineStage,
    events: Vec<PipelineEvent>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Orchestrator {
    /// Create a new orchestrator for a single run
    pub fn new(config: OrchestratorConfig, router: Arc<dyn ToolRouter>) -> Self {
        Self {
            config,
            router,
            stage: PipelineStage::Planning,
            events: Vec::new(),
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Current stage (Failed after a halted run)
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Events accumulated so far, also available after a failed run
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Emit an event
    async fn emit(&mut self, event: PipelineEvent) {
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Record the failure, mark the run failed, and build the error
    /// the caller sees
    async fn fail_stage(&mut self, stage: PipelineStage, err: ToolError) -> anyhow::Error {
        let message = tools::error_text(stage.tool_name(), &err);
        tracing::warn!(stage = ?stage, %message, "stage failed, halting run");
        self.emit(
            PipelineEvent::new(PipelineEventKind::StageFailed, stage)
                .with_data(json!({ "error": message })),
        )
        .await;
        self.emit(PipelineEvent::new(
            PipelineEventKind::PipelineFailed,
            PipelineStage::Failed,
        ))
        .await;
        self.stage = PipelineStage::Failed;
        anyhow::anyhow!(message)
    }

    /// Run the pipeline on a validated query
    #[tracing::instrument(skip(self, query), fields(topic = %query.topic))]
    pub async fn run(&mut self, query: ResearchQuery) -> Result<PipelineOutcome> {
        let mut transcript = Vec::new();

        self.emit(PipelineEvent::new(
            PipelineEventKind::PipelineStarted,
            PipelineStage::Planning,
        ))
        .await;

        // Stage 1: plan - establishes the session everything else presents
        self.emit(PipelineEvent::new(
            PipelineEventKind::StageStarted,
            PipelineStage::Planning,
        ))
        .await;
        let plan = match tools::plan::run(self.router.as_ref(), &query).await {
            Ok(plan) => plan,
            Err(err) => return Err(self.fail_stage(PipelineStage::Planning, err).await),
        };
        transcript.push(StageRecord {
            stage: PipelineStage::Planning,
            output: plan.render(),
        });
        self.emit(
            PipelineEvent::new(PipelineEventKind::StageCompleted, PipelineStage::Planning)
                .with_data(json!({ "session_id": plan.session.id() })),
        )
        .await;
        self.stage = self.stage.next();

        // Stage 2: parallel research fan-out
        self.emit(PipelineEvent::new(
            PipelineEventKind::StageStarted,
            PipelineStage::Research,
        ))
        .await;
        let requests = self.research_requests(&query);
        let research = match tools::research::run(
            self.router.as_ref(),
            &plan.session,
            &requests,
            self.config.slug_policy,
        )
        .await
        {
            Ok(research) => research,
            Err(err) => return Err(self.fail_stage(PipelineStage::Research, err).await),
        };
        transcript.push(StageRecord {
            stage: PipelineStage::Research,
            output: research.render(),
        });
        self.emit(
            PipelineEvent::new(PipelineEventKind::StageCompleted, PipelineStage::Research)
                .with_data(json!({ "workbench_keys": research.workbench_keys })),
        )
        .await;
        self.stage = self.stage.next();

        // Stage 3: remote analysis over the workbench keys
        self.emit(PipelineEvent::new(
            PipelineEventKind::StageStarted,
            PipelineStage::Analysis,
        ))
        .await;
        let analysis =
            match tools::analysis::run(self.router.as_ref(), &research.workbench_keys).await {
                Ok(analysis) => analysis,
                Err(err) => return Err(self.fail_stage(PipelineStage::Analysis, err).await),
            };
        transcript.push(StageRecord {
            stage: PipelineStage::Analysis,
            output: analysis.render(),
        });
        self.emit(
            PipelineEvent::new(PipelineEventKind::StageCompleted, PipelineStage::Analysis)
                .with_data(json!({
                    "duration_ms": analysis.execution.duration_ms,
                    "missing_keys": analysis.missing_keys,
                })),
        )
        .await;
        self.stage = self.stage.next();

        // Stage 4: compose and publish the synthesis
        self.emit(PipelineEvent::new(
            PipelineEventKind::StageStarted,
            PipelineStage::Publishing,
        ))
        .await;
        let synthesis = compose_synthesis(&query, &plan, &analysis, &research.workbench_keys);
        let publish = match tools::publish::run(&self.config.report_dir, &synthesis).await {
            Ok(publish) => publish,
            Err(err) => return Err(self.fail_stage(PipelineStage::Publishing, err).await),
        };
        let confirmation = publish.render();
        transcript.push(StageRecord {
            stage: PipelineStage::Publishing,
            output: confirmation.clone(),
        });
        self.emit(
            PipelineEvent::new(PipelineEventKind::StageCompleted, PipelineStage::Publishing)
                .with_data(json!({ "report_id": publish.report_id })),
        )
        .await;

        self.stage = self.stage.next();
        self.emit(PipelineEvent::new(
            PipelineEventKind::PipelineCompleted,
            PipelineStage::Complete,
        ))
        .await;

        Ok(PipelineOutcome {
            report_id: publish.report_id,
            confirmation,
            transcript,
            events: self.events.clone(),
            success: true,
        })
    }

    /// One request per configured primary slug, all carrying the topic
    /// and keyword arguments
    fn research_requests(&self, query: &ResearchQuery) -> Vec<ToolExecutionRequest> {
        self.config
            .primary_slugs
            .iter()
            .map(|slug| {
                ToolExecutionRequest::new(slug.clone())
                    .with_argument("query", json!(query.topic))
                    .with_argument("keywords", json!(query.keywords))
            })
            .collect()
    }
}

/// Assemble the final synthesis from the stage outputs.
///
/// The reasoning step itself is external to this crate; this composer
/// is the deterministic default used when no external actor supplies
/// its own synthesis.
pub fn compose_synthesis(
    query: &ResearchQuery,
    plan: &PlanOutput,
    analysis: &AnalysisOutput,
    workbench_keys: &[String],
) -> FinalSynthesis {
    let parsed: Option<serde_json::Value> = serde_json::from_str(&analysis.execution.stdout).ok();

    let findings = parsed
        .as_ref()
        .and_then(|v| v.get("summary"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| analysis.execution.stdout.clone());

    let hypothesis = match parsed
        .as_ref()
        .and_then(|v| v.get("final_clean_compounds"))
        .and_then(|v| v.as_u64())
    {
        Some(n) => format!(
            "The {n} compound(s) surfaced for \"{}\" support a testable delivery mechanism.",
            query.topic
        ),
        None => format!(
            "The acquired evidence for \"{}\" supports a testable delivery mechanism.",
            query.topic
        ),
    };

    FinalSynthesis {
        hypothesis,
        protocol_summary: plan.workflow_steps.join(" "),
        analysis_findings: findings,
        prior_art_reference_links: workbench_keys.to_vec(),
        next_steps: format!("Hand off to human researchers: {}", query.target_output),
    }
}
