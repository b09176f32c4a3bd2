//! Media-Harvester: a polite single-page media downloader
//!
//! This crate fetches one HTML page, finds the images, audio or video it embeds,
//! and downloads each resource into a local directory while keeping the request
//! rate under a fixed ceiling and never overwriting existing files.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Media-Harvester runs
///
/// Only configuration problems and a failed page fetch escape a run; every
/// per-resource failure is recorded in the run's outcomes instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page fetch failed for {url}: HTTP {status_code}")]
    PageFetch { url: String, status_code: u16 },

    #[error("Page fetch failed for {url}: {cause}")]
    PageTransport { url: String, cause: String },

    #[error("Run cancelled before the page was fetched")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown resource kind: {0} (expected image, audio or video)")]
    UnknownKind(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Invalid URL '{reference}': {reason}")]
    InvalidUrl { reference: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Result type alias for Media-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlTarget, ResourceKind};
pub use crawler::{harvest, Coordinator};
pub use state::{DownloadOutcome, DownloadStatus, RunReport, RunState, SkipReason};
pub use crate::url::{file_name_from_url, resolve, ResolvedResource, ResourceReference};
