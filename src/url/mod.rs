//! URL handling module for Media-Harvester
//!
//! This module provides the reference types flowing from the extractor to the
//! downloader, resolution of raw references against the page URL, and derivation
//! of file names from resource URLs.

mod filename;
mod resolve;

use std::fmt;
use url::Url;

// Re-export main functions
pub use filename::{file_name_from_url, sanitize_file_name, FALLBACK_FILE_NAME};
pub use resolve::resolve;

/// A resource reference exactly as found in markup
///
/// May be absolute, scheme-relative (`//host/path`) or path-relative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceReference {
    pub raw: String,
}

impl ResourceReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A reference resolved to an absolute, fetchable URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedResource {
    pub url: Url,
}

impl ResolvedResource {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// File name this resource would like to be saved under
    pub fn file_name(&self) -> String {
        file_name_from_url(&self.url)
    }
}

impl fmt::Display for ResolvedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
