//! # Plan Stage
//!
//! First stage: validate the research query and establish the run's
//! session via plan creation. The rendered text embeds the session id
//! verbatim - the next stage depends on extracting it.

use crate::error::ToolResult;
use crate::models::ResearchQuery;
use crate::router::{SessionHandle, ToolRouter};
use crate::tools::slugs::{self, SlugPolicy, ARXIV_SEARCH, PUBCHEM_QUERY};

const TOOL_NAME: &str = "CreateWorkflowPlan";

/// Typed output of the plan stage
#[derive(Debug, Clone)]
pub struct PlanOutput {
    pub session: SessionHandle,
    pub complexity: String,
    pub workflow_steps: Vec<String>,
}

impl PlanOutput {
    /// Text view for the external boundary. Embeds the session id and
    /// the step list verbatim.
    pub fn render(&self) -> String {
        format!(
            "Plan successful. Session ID: {}. Complexity: {} Workflow steps: {:?}.",
            self.session, self.complexity, self.workflow_steps
        )
    }
}

/// Run plan creation for a validated query
pub async fn run(router: &dyn ToolRouter, query: &ResearchQuery) -> ToolResult<PlanOutput> {
    query.validate()?;

    let primary_slugs = vec![
        slugs::resolve(ARXIV_SEARCH, SlugPolicy::Permissive)?,
        slugs::resolve(PUBCHEM_QUERY, SlugPolicy::Permissive)?,
    ];
    let use_case = format!(
        "Generate a novel hypothesis and experimental protocol for the topic: {}",
        query.topic
    );

    let plan = router.create_plan(&use_case, &primary_slugs).await?;
    Ok(PlanOutput {
        session: plan.session,
        complexity: plan.complexity,
        workflow_steps: plan.workflow_steps,
    })
}

/// Text boundary: input must be a JSON string of the ResearchQuery
/// schema; output is the rendered plan or a wrapper error message
pub async fn create_workflow_plan(router: &dyn ToolRouter, query_json: &str) -> String {
    let query = match ResearchQuery::from_json(query_json) {
        Ok(query) => query,
        Err(err) => return super::error_text(TOOL_NAME, &err),
    };
    match run(router, &query).await {
        Ok(output) => output.render(),
        Err(err) => super::error_text(TOOL_NAME, &err),
    }
}
