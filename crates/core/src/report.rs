//! # Report Sink
//!
//! Durable file sink for published reports. Each report is keyed by a
//! generated identifier and carries every FinalSynthesis field
//! verbatim.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::FinalSynthesis;

/// Default report directory (`.crucible/reports`), overridable via
/// `CRUCIBLE_REPORT_DIR`
pub fn default_report_dir() -> PathBuf {
    if let Ok(path) = std::env::var("CRUCIBLE_REPORT_DIR") {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".crucible")
        .join("reports")
}

/// Render the report body. Pure, so the content contract is testable
/// without touching the filesystem.
pub fn render_report(report_id: &str, synthesis: &FinalSynthesis) -> String {
    let references = if synthesis.prior_art_reference_links.is_empty() {
        "(none recorded)".to_string()
    } else {
        synthesis
            .prior_art_reference_links
            .iter()
            .map(|link| format!("- {link}"))
            .collect::<Vec<String>>()
            .join("\n")
    };

    format!(
        "# Research Synthesis Report\n\n\
         Report ID: {report_id}\n\
         Generated: {generated}\n\n\
         ## Hypothesis\n\n{hypothesis}\n\n\
         ## Protocol Summary\n\n{protocol}\n\n\
         ## Analysis Findings\n\n{findings}\n\n\
         ## Prior Art References\n\n{references}\n\n\
         ## Next Steps\n\n{next_steps}\n",
        generated = Utc::now().to_rfc3339(),
        hypothesis = synthesis.hypothesis,
        protocol = synthesis.protocol_summary,
        findings = synthesis.analysis_findings,
        next_steps = synthesis.next_steps,
    )
}

/// Write the report under `dir`, returning the file path
pub async fn write_report(
    dir: &Path,
    report_id: &str,
    synthesis: &FinalSynthesis,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create report directory: {dir:?}"))?;

    let path = dir.join(format!("{report_id}.md"));
    fs::write(&path, render_report(report_id, synthesis))
        .await
        .with_context(|| format!("Failed to write report: {path:?}"))?;

    Ok(path)
}
