//! Run statistics for the terminal
//!
//! This module condenses a run report into counts and prints them.

use crate::state::{DownloadStatus, RunReport, SkipReason};
use std::collections::BTreeMap;

/// Run statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    /// References processed
    pub total: usize,

    pub saved: usize,

    pub skipped_non_success: usize,

    pub skipped_error: usize,

    /// Non-success status codes and how often each was seen
    pub status_codes: BTreeMap<u16, usize>,

    /// Error skips grouped by category (invalid_url, transport, filesystem, cancelled)
    pub error_summary: BTreeMap<&'static str, usize>,

    pub success_rate: f64,

    pub cancelled: bool,
}

/// Computes statistics from a finished run
pub fn compute_statistics(report: &RunReport) -> RunStatistics {
    let mut status_codes = BTreeMap::new();
    let mut error_summary = BTreeMap::new();

    for outcome in &report.outcomes {
        match (&outcome.status, &outcome.reason) {
            (DownloadStatus::SkippedNonSuccess, Some(SkipReason::HttpStatus(code))) => {
                *status_codes.entry(*code).or_insert(0) += 1;
            }
            (DownloadStatus::SkippedError, Some(reason)) => {
                *error_summary.entry(error_category(reason)).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    RunStatistics {
        total: report.total(),
        saved: report.saved(),
        skipped_non_success: report.skipped_non_success(),
        skipped_error: report.skipped_error(),
        status_codes,
        error_summary,
        success_rate: report.success_rate(),
        cancelled: report.cancelled,
    }
}

fn error_category(reason: &SkipReason) -> &'static str {
    match reason {
        SkipReason::InvalidUrl(_) => "invalid_url",
        SkipReason::HttpStatus(_) => "http_status",
        SkipReason::Transport(_) => "transport",
        SkipReason::Filesystem(_) => "filesystem",
        SkipReason::Cancelled => "cancelled",
    }
}

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `report` - The finished run
pub fn print_summary(report: &RunReport) {
    let stats = compute_statistics(report);

    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Site: {}", report.target.site_url);
    println!("  Kind: {}", report.target.kind);
    println!("  Destination: {}", report.target.destination_dir.display());
    println!("  Resources found: {}", stats.total);
    println!();

    println!("Outcomes:");
    println!("  Saved: {}", stats.saved);
    println!("  Skipped (non-success status): {}", stats.skipped_non_success);
    println!("  Skipped (error): {}", stats.skipped_error);
    println!();

    if !stats.status_codes.is_empty() {
        println!("Status Codes:");
        for (code, count) in &stats.status_codes {
            println!("  HTTP {}: {}", code, count);
        }
        println!();
    }

    if !stats.error_summary.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (category, count) in error_counts {
            println!("  {}: {}", category, count);
        }
        println!();
    }

    if stats.cancelled {
        println!("Run was cancelled before every resource was processed.");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} resources saved)",
        stats.success_rate, stats.saved, stats.total
    );
}
