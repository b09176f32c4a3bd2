//! Markdown report generation
//!
//! This module renders a human-readable markdown report of a run, including
//! run metadata, counts, saved files and skipped resources with their reasons.

use crate::output::{OutputError, OutputResult};
use crate::state::{DownloadStatus, RunReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report of a run to a file
///
/// # Arguments
///
/// * `report` - The finished run
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)
        .map_err(|e| OutputError::Write(format!("{}: {}", output_path.display(), e)))?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Media-Harvester Run Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Site**: {}\n", report.target.site_url));
    md.push_str(&format!("- **Kind**: {}\n", report.target.kind));
    md.push_str(&format!(
        "- **Destination**: {}\n",
        report.target.destination_dir.display()
    ));
    md.push_str(&format!(
        "- **Rate Ceiling**: {} requests/minute\n",
        report.target.requests_per_minute
    ));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!(
        "- **Cancelled**: {}\n\n",
        if report.cancelled { "yes" } else { "no" }
    ));

    // Counts
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Saved | {} |\n", report.saved()));
    md.push_str(&format!(
        "| Skipped (non-success status) | {} |\n",
        report.skipped_non_success()
    ));
    md.push_str(&format!("| Skipped (error) | {} |\n", report.skipped_error()));
    md.push_str(&format!("| Total | {} |\n\n", report.total()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    let saved: Vec<_> = report.outcomes.iter().filter(|o| o.is_saved()).collect();
    if !saved.is_empty() {
        md.push_str("## Saved Files\n\n");
        md.push_str("| # | URL | File |\n");
        md.push_str("|---|-----|------|\n");
        for outcome in saved {
            let file = outcome
                .saved_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                outcome.index,
                escape_cell(&outcome.display_url()),
                escape_cell(&file)
            ));
        }
        md.push('\n');
    }

    let skipped: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| o.status != DownloadStatus::Saved)
        .collect();
    if !skipped.is_empty() {
        md.push_str("## Skipped Resources\n\n");
        md.push_str("| # | URL | Status | Reason |\n");
        md.push_str("|---|-----|--------|--------|\n");
        for outcome in skipped {
            let reason = outcome
                .reason
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                outcome.index,
                escape_cell(&outcome.display_url()),
                outcome.status,
                escape_cell(&reason)
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps pipes inside a value from splitting the table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
