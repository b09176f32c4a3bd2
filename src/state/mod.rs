//! State module for tracking a harvesting run
//!
//! # Components
//!
//! - `RunState`: The phases of a run (idle, page fetched, extracting, downloading, done)
//! - `DownloadOutcome`: The typed result of processing one resource reference
//! - `RunReport`: All outcomes of a run, in document order, with derived counts

mod outcome;
mod run_state;

// Re-export main types
pub use outcome::{DownloadOutcome, DownloadStatus, RunReport, SkipReason};
pub use run_state::RunState;
