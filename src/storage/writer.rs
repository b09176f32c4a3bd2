//! Atomic file writes
//!
//! Bytes go to a hidden temp file next to the target and are renamed over it once
//! complete, so an interrupted run never leaves a truncated file under a final name.
//! Temp files are claimed with `create_new` like final names, so a temp file never
//! replaces a file that was already there.

use crate::storage::namer::try_claim;
use std::ffi::OsString;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Returns the temp path for `path` on the given attempt
///
/// Attempt 0 is `dir/.name.part`; later attempts are `dir/.name.<attempt>.part`.
pub fn temp_path_for(path: &Path, attempt: u32) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    if attempt > 0 {
        name.push(format!(".{}", attempt));
    }
    name.push(".part");
    path.with_file_name(name)
}

/// Writes `bytes` to `path` through a temp file and a rename
///
/// `path` is normally the placeholder created by [`reserve`](super::reserve); it is
/// replaced only once the temp file holds the full content.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp = claim_temp_path(path).await?;

    let result = write_then_rename(&temp, path, bytes).await;
    if result.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    result
}

/// Claims the first free temp path for `path`
async fn claim_temp_path(path: &Path) -> io::Result<PathBuf> {
    let mut attempt: u32 = 0;
    loop {
        let temp = temp_path_for(path, attempt);
        if try_claim(&temp).await? {
            return Ok(temp);
        }

        attempt = attempt.checked_add(1).ok_or_else(|| {
            io::Error::new(
                ErrorKind::Other,
                format!("no free temp name left for {}", path.display()),
            )
        })?;
    }
}

async fn write_then_rename(temp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).open(temp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temp, path).await
}
