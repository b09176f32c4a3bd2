//! Per-resource outcomes and the run report built from them

use crate::config::CrawlTarget;
use crate::url::{ResolvedResource, ResourceReference};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Final status of one resource reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    /// The resource was fetched and written to disk
    Saved,

    /// The server answered with a status outside 2xx
    SkippedNonSuccess,

    /// Resolution, transport or filesystem failure
    SkippedError,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::SkippedNonSuccess => "skipped_non_success",
            Self::SkippedError => "skipped_error",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a resource was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The reference could not be resolved to a fetchable URL
    InvalidUrl(String),

    /// The resource fetch returned a non-success status
    HttpStatus(u16),

    /// Timeout, DNS failure, refused connection, TLS failure, ...
    Transport(String),

    /// The file could not be reserved or written
    Filesystem(String),

    /// The run was cancelled before this resource finished
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(reason) => write!(f, "invalid URL: {}", reason),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Transport(cause) => write!(f, "transport error: {}", cause),
            Self::Filesystem(cause) => write!(f, "filesystem error: {}", cause),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// The typed result of processing one resource reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Position of the reference in document order
    pub index: usize,

    /// The reference as found in markup
    pub reference: ResourceReference,

    /// The resolved URL (absent only when resolution failed)
    pub resource: Option<ResolvedResource>,

    pub status: DownloadStatus,

    /// Where the resource was written (only for `Saved`)
    pub saved_path: Option<PathBuf>,

    /// Why the resource was skipped (absent for `Saved`)
    pub reason: Option<SkipReason>,
}

impl DownloadOutcome {
    pub fn saved(
        index: usize,
        reference: ResourceReference,
        resource: ResolvedResource,
        saved_path: PathBuf,
    ) -> Self {
        Self {
            index,
            reference,
            resource: Some(resource),
            status: DownloadStatus::Saved,
            saved_path: Some(saved_path),
            reason: None,
        }
    }

    pub fn non_success(
        index: usize,
        reference: ResourceReference,
        resource: ResolvedResource,
        status_code: u16,
    ) -> Self {
        Self {
            index,
            reference,
            resource: Some(resource),
            status: DownloadStatus::SkippedNonSuccess,
            saved_path: None,
            reason: Some(SkipReason::HttpStatus(status_code)),
        }
    }

    pub fn error(
        index: usize,
        reference: ResourceReference,
        resource: Option<ResolvedResource>,
        reason: SkipReason,
    ) -> Self {
        Self {
            index,
            reference,
            resource,
            status: DownloadStatus::SkippedError,
            saved_path: None,
            reason: Some(reason),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.status == DownloadStatus::Saved
    }

    /// The URL if resolved, otherwise the raw reference
    pub fn display_url(&self) -> String {
        match &self.resource {
            Some(resource) => resource.to_string(),
            None => self.reference.to_string(),
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: CrawlTarget,

    /// One outcome per processed reference, in document order
    pub outcomes: Vec<DownloadOutcome>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// True if the run was cancelled before every reference was processed
    pub cancelled: bool,
}

impl RunReport {
    fn count(&self, status: DownloadStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn saved(&self) -> usize {
        self.count(DownloadStatus::Saved)
    }

    pub fn skipped_non_success(&self) -> usize {
        self.count(DownloadStatus::SkippedNonSuccess)
    }

    pub fn skipped_error(&self) -> usize {
        self.count(DownloadStatus::SkippedError)
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Statuses in document order
    pub fn statuses(&self) -> Vec<DownloadStatus> {
        self.outcomes.iter().map(|o| o.status).collect()
    }

    /// Paths of every saved file, in document order
    pub fn saved_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.saved_path.as_ref())
            .collect()
    }

    /// Percentage of processed references that were saved
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            (self.saved() as f64 / self.total() as f64) * 100.0
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
