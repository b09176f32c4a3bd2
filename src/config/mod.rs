//! Configuration module for Media-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning a validated configuration into the immutable [`CrawlTarget`] of a run.
//!
//! # Example
//!
//! ```no_run
//! use media_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Rate ceiling: {} requests/minute", config.target.requests_per_minute);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlTarget, DownloadConfig, HttpConfig, ResourceKind, TargetConfig,
    DEFAULT_FOLDER_PATH, DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
