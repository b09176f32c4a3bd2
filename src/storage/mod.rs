//! Storage module for writing downloaded resources
//!
//! This module owns every mutation of the destination directory:
//! - Creating the directory (and its parents) on first use
//! - Reserving collision-free file names with exclusive creation
//! - Writing resource bytes through a temp file and an atomic rename

mod namer;
mod writer;

pub use namer::{candidate_name, reserve, split_file_name};
pub use writer::{temp_path_for, write_atomic};

use std::io;
use std::path::{Path, PathBuf};

/// Reserves a collision-free path and writes `bytes` to it
///
/// # Arguments
///
/// * `directory` - Destination directory (created if missing)
/// * `desired_name` - File name the resource would like to have
/// * `bytes` - Resource content
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path the resource was written to
/// * `Err(io::Error)` - The directory, reservation or write failed; nothing is
///   left behind under the reserved name
pub async fn save_resource(directory: &Path, desired_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let path = reserve(directory, desired_name).await?;

    if let Err(e) = write_atomic(&path, bytes).await {
        tracing::debug!("Releasing reserved path {} after failed write", path.display());
        let _ = tokio::fs::remove_file(&path).await;
        return Err(e);
    }

    Ok(path)
}
