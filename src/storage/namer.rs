//! Collision-free file naming
//!
//! `reserve` claims a path by creating it with `create_new`, so two workers (or two
//! runs) asking for the same name can never both receive it.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};

/// Splits a file name into base name and extension
///
/// The extension keeps its leading dot. A name whose only dot is the first
/// character (`.env`) has no extension.
///
/// # Examples
///
/// ```
/// use media_harvester::storage::split_file_name;
///
/// assert_eq!(split_file_name("cat.png"), ("cat", ".png"));
/// assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_file_name("README"), ("README", ""));
/// ```
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

/// Builds the n-th alternative name: `cat.png` -> `cat_(n).png`
pub fn candidate_name(base: &str, extension: &str, n: u32) -> String {
    format!("{}_({}){}", base, n, extension)
}

/// Reserves a collision-free path for `desired_name` inside `directory`
///
/// Guarantees:
/// - `directory` and its parents exist when this returns `Ok`
/// - `directory/desired_name` is returned if nothing exists there
/// - otherwise `base_(1).ext`, `base_(2).ext`, ... are probed in order and the
///   first free one is returned
/// - the returned path did not exist before the call; it now exists as an empty
///   placeholder owned by the caller, so no existing file is ever overwritten
///
/// # Errors
///
/// Any IO error other than "already exists" (permission denied, read-only
/// filesystem, missing parent that cannot be created, ...).
pub async fn reserve(directory: &Path, desired_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(directory).await?;

    let first = directory.join(desired_name);
    if try_claim(&first).await? {
        return Ok(first);
    }

    let (base, extension) = split_file_name(desired_name);
    let mut n: u32 = 1;
    loop {
        let candidate = directory.join(candidate_name(base, extension, n));
        if try_claim(&candidate).await? {
            tracing::debug!(
                "Name {} taken, reserved {}",
                desired_name,
                candidate.display()
            );
            return Ok(candidate);
        }

        n = n.checked_add(1).ok_or_else(|| {
            io::Error::new(
                ErrorKind::Other,
                format!("no free name left for {}", desired_name),
            )
        })?;
    }
}

/// Creates `path` exclusively; `Ok(false)` means something already exists there
pub(crate) async fn try_claim(path: &Path) -> io::Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}
