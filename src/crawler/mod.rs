//! Crawler module for page fetching and resource harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with outcome classification
//! - HTML parsing and resource reference extraction
//! - Request rate limiting
//! - Run cancellation
//! - Overall run coordination

mod cancel;
mod coordinator;
mod extractor;
mod fetcher;
mod rate_limiter;

pub use cancel::CancelToken;
pub use coordinator::{harvest, Coordinator};
pub use extractor::{extract_references, ParsedPage};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use rate_limiter::RateLimiter;
