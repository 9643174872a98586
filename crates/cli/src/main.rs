//! Crucible CLI
//!
//! Thin entry point around the pipeline orchestrator: parses the
//! research query from flags, selects a router backend, streams run
//! events, and prints the publish confirmation.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crucible_core::models::ResearchQuery;
use crucible_core::pipeline::{Orchestrator, OrchestratorConfig, PipelineEvent};
use crucible_core::router::{HttpRouter, RouterConfig, SimulatedRouter, ToolRouter};
use crucible_core::tools::slugs::SlugPolicy;

const ROUTER_URL_VAR: &str = "CRUCIBLE_ROUTER_URL";
const ROUTER_KEY_VAR: &str = "CRUCIBLE_ROUTER_API_KEY";

#[derive(Parser)]
#[command(name = "crucible", about = "Run the research tool pipeline end to end")]
struct Cli {
    /// Scientific topic to investigate
    #[arg(long)]
    topic: String,

    /// Desired deliverable
    #[arg(
        long,
        default_value = "Draft a full hypothesis, protocol summary, and prior art matrix."
    )]
    target_output: String,

    /// Core keywords for the literature search (comma-separated or repeated)
    #[arg(long, value_delimiter = ',', required = true)]
    keywords: Vec<String>,

    /// Directory the published report is written to
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Use the live HTTP tool router instead of the simulator
    #[arg(long)]
    live: bool,

    /// Reject unregistered tool slugs instead of passing them through
    #[arg(long)]
    strict_slugs: bool,
}

/// Pick the live backend when requested and configured; otherwise fall
/// back to the simulator with a warning
fn select_router(live: bool, config: &RouterConfig) -> Result<Arc<dyn ToolRouter>> {
    if live {
        match (std::env::var(ROUTER_URL_VAR), std::env::var(ROUTER_KEY_VAR)) {
            (Ok(base_url), Ok(api_key)) if !api_key.is_empty() => {
                tracing::info!(%base_url, "using live tool router");
                return Ok(Arc::new(HttpRouter::new(base_url, api_key, config)?));
            }
            _ => {
                tracing::warn!(
                    "{ROUTER_URL_VAR} or {ROUTER_KEY_VAR} not set. Tools will be simulated."
                );
            }
        }
    }
    Ok(Arc::new(SimulatedRouter::new(config.clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let router = select_router(cli.live, &RouterConfig::default())?;

    let mut config = OrchestratorConfig::default();
    if let Some(dir) = cli.report_dir {
        config.report_dir = dir;
    }
    if cli.strict_slugs {
        config.slug_policy = SlugPolicy::Strict;
    }

    let (tx, mut rx) = mpsc::channel::<PipelineEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event.data {
                Some(data) => {
                    tracing::info!(kind = ?event.kind, stage = ?event.stage, data = %data)
                }
                None => tracing::info!(kind = ?event.kind, stage = ?event.stage),
            }
        }
    });

    let query = ResearchQuery::new(cli.topic, cli.target_output, cli.keywords);
    let mut orchestrator = Orchestrator::new(config, router).with_event_channel(tx);
    let outcome = orchestrator.run(query).await;

    // release the event sender so the printer drains and exits
    drop(orchestrator);
    printer.await.ok();

    let outcome = outcome?;
    println!("{}", outcome.confirmation);
    Ok(())
}
