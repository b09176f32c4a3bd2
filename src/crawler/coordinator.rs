//! Harvest coordinator - main run orchestration logic
//!
//! This module drives one run end to end:
//! - Fetching the page (a failure here aborts the run)
//! - Extracting resource references from it
//! - Resolving, fetching and saving every reference, isolating per-item failures
//! - Aggregating typed outcomes into the run report

use crate::config::{Config, CrawlTarget, DownloadConfig, HttpConfig};
use crate::crawler::cancel::CancelToken;
use crate::crawler::extractor::extract_references;
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::{FetchResult, Fetcher};
use crate::state::{DownloadOutcome, RunReport, RunState, SkipReason};
use crate::storage::save_resource;
use crate::url::{resolve, ResourceReference};
use crate::HarvestError;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Main harvest coordinator structure
pub struct Coordinator {
    target: CrawlTarget,
    context: DownloadContext,
    max_concurrent_downloads: usize,
    state: RunState,
}

/// Everything a single resource download needs, shareable across worker tasks
#[derive(Clone)]
struct DownloadContext {
    site_url: Url,
    destination_dir: PathBuf,
    fetcher: Fetcher,
    rate_limiter: Arc<RateLimiter>,
    cancel: CancelToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `target` - What to harvest and where to save it
    /// * `http` - User agent and timeout for every request
    /// * `download` - Worker pool size
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(
        target: CrawlTarget,
        http: &HttpConfig,
        download: &DownloadConfig,
    ) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(http)?;
        let rate_limiter = Arc::new(RateLimiter::new(target.request_interval()));

        let context = DownloadContext {
            site_url: target.site_url.clone(),
            destination_dir: target.destination_dir.clone(),
            fetcher,
            rate_limiter,
            cancel: CancelToken::new(),
        };

        Ok(Self {
            target,
            context,
            max_concurrent_downloads: download.max_concurrent_downloads.max(1) as usize,
            state: RunState::Idle,
        })
    }

    /// Validates a configuration and creates a coordinator from it
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let target = CrawlTarget::from_config(config)?;
        Self::new(target, &config.http, &config.download)
    }

    /// Replaces the coordinator's cancel token with one controlled by the caller
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.context.cancel = cancel;
        self
    }

    /// A handle that cancels this coordinator's run
    pub fn cancel_token(&self) -> CancelToken {
        self.context.cancel.clone()
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the harvest
    ///
    /// 1. Rate-limit, then fetch the page; anything but success aborts the run
    /// 2. Extract references of the target kind, in document order
    /// 3. For each reference: resolve, rate-limit, fetch, reserve a name, write
    /// 4. Log the summary and return the report
    ///
    /// Per-resource failures are recorded in the report and never abort the run.
    pub async fn run(&mut self) -> Result<RunReport, HarvestError> {
        if !self.state.can_transition_to(RunState::PageFetched) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: RunState::PageFetched,
            });
        }

        let started_at = Utc::now();
        tracing::info!(
            "Downloading {} from: {}",
            self.target.kind.plural(),
            self.target.site_url
        );

        let body = self.fetch_page().await?;
        self.transition(RunState::PageFetched)?;

        self.transition(RunState::Extracting)?;
        let references = extract_references(&body, self.target.kind);
        tracing::debug!(
            "Found {} <{}> references on {}",
            references.len(),
            self.target.kind.tag_name(),
            self.target.site_url
        );

        self.transition(RunState::PerResourceLoop)?;
        let total = references.len();
        let outcomes = if self.max_concurrent_downloads > 1 {
            self.download_concurrent(references).await
        } else {
            self.download_sequential(references).await
        };

        let cancelled = outcomes.len() < total
            || outcomes
                .iter()
                .any(|o| o.reason == Some(SkipReason::Cancelled));

        self.transition(RunState::Done)?;

        let report = RunReport {
            target: self.target.clone(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            cancelled,
        };

        tracing::info!(
            "Summary: {} saved, {} skipped (non-success status), {} skipped (error)",
            report.saved(),
            report.skipped_non_success(),
            report.skipped_error()
        );
        if report.cancelled {
            tracing::warn!(
                "Run cancelled after {} of {} resources",
                report.total(),
                total
            );
        } else {
            tracing::info!("All downloads completed");
        }

        Ok(report)
    }

    /// Fetches the page body; the only fetch whose failure is fatal
    async fn fetch_page(&self) -> Result<String, HarvestError> {
        let ctx = &self.context;
        let url = &self.target.site_url;

        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(HarvestError::Cancelled),
            result = async {
                ctx.rate_limiter.acquire().await;
                ctx.fetcher.fetch(url).await
            } => result,
        };

        match result {
            FetchResult::Success { body, .. } => Ok(String::from_utf8_lossy(&body).into_owned()),
            FetchResult::NonSuccess { status_code } => {
                tracing::error!("Page {} answered HTTP {}", url, status_code);
                Err(HarvestError::PageFetch {
                    url: url.to_string(),
                    status_code,
                })
            }
            FetchResult::TransportError { cause } => {
                tracing::error!("Page {} could not be fetched: {}", url, cause);
                Err(HarvestError::PageTransport {
                    url: url.to_string(),
                    cause,
                })
            }
        }
    }

    /// One resource at a time, in document order
    async fn download_sequential(&self, references: Vec<ResourceReference>) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(references.len());

        for (index, reference) in references.into_iter().enumerate() {
            if self.context.cancel.is_cancelled() {
                break;
            }
            outcomes.push(process_resource(&self.context, index, reference).await);
        }

        outcomes
    }

    /// Up to `max_concurrent_downloads` resources in flight, sharing one rate limiter
    ///
    /// Outcomes are sorted back into document order.
    async fn download_concurrent(&self, references: Vec<ResourceReference>) -> Vec<DownloadOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_downloads));
        let mut tasks = JoinSet::new();

        for (index, reference) in references.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.context.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let ctx = self.context.clone();
            tasks.spawn(async move {
                let _permit = permit;
                process_resource(&ctx, index, reference).await
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("Download task failed: {}", e),
            }
        }

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }

    fn transition(&mut self, to: RunState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::trace!("Run state {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }
}

/// Resolves, fetches and saves one reference
///
/// Every failure is turned into an outcome; nothing here can abort the run.
async fn process_resource(
    ctx: &DownloadContext,
    index: usize,
    reference: ResourceReference,
) -> DownloadOutcome {
    let resource = match resolve(reference.as_str(), &ctx.site_url) {
        Ok(resource) => resource,
        Err(e) => {
            tracing::warn!("Skipping reference '{}': {}", reference, e);
            return DownloadOutcome::error(index, reference, None, SkipReason::InvalidUrl(e.to_string()));
        }
    };

    let result = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => None,
        result = async {
            ctx.rate_limiter.acquire().await;
            ctx.fetcher.fetch(&resource.url).await
        } => Some(result),
    };

    let body = match result {
        Some(FetchResult::Success { body, .. }) => body,
        Some(FetchResult::NonSuccess { status_code }) => {
            tracing::warn!("Skipping {}: HTTP {}", resource, status_code);
            return DownloadOutcome::non_success(index, reference, resource, status_code);
        }
        Some(FetchResult::TransportError { cause }) => {
            tracing::warn!("Skipping {}: {}", resource, cause);
            return DownloadOutcome::error(
                index,
                reference,
                Some(resource),
                SkipReason::Transport(cause),
            );
        }
        None => {
            tracing::debug!("Cancelled before {} finished", resource);
            return DownloadOutcome::error(index, reference, Some(resource), SkipReason::Cancelled);
        }
    };

    match save_resource(&ctx.destination_dir, &resource.file_name(), &body).await {
        Ok(path) => {
            let saved_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!("Downloaded: {}", saved_name);
            DownloadOutcome::saved(index, reference, resource, path)
        }
        Err(e) => {
            tracing::error!("Could not save {}: {}", resource, e);
            DownloadOutcome::error(
                index,
                reference,
                Some(resource),
                SkipReason::Filesystem(e.to_string()),
            )
        }
    }
}

/// Runs a complete harvest from a configuration
///
/// # Example
///
/// ```no_run
/// use media_harvester::config::load_config;
/// use media_harvester::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = harvest(&config).await?;
/// println!("{} files saved", report.saved());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<RunReport, HarvestError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
