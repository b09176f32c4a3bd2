//! Media-Harvester main entry point
//!
//! This is the command-line interface for the Media-Harvester downloader.

use anyhow::Context;
use clap::Parser;
use media_harvester::config::{load_config_with_hash, Config};
use media_harvester::output::{print_summary, write_markdown_report};
use media_harvester::{Coordinator, ResourceKind};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Media-Harvester: A polite single-page media downloader
///
/// Media-Harvester fetches one web page, finds every image, audio or video
/// element on it and downloads the referenced files into a folder, staying
/// under a fixed number of requests per minute and never overwriting files.
#[derive(Parser, Debug)]
#[command(name = "media-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-page media downloader", long_about = None)]
struct Cli {
    /// Page whose media should be downloaded
    #[arg(long, value_name = "URL")]
    website_url: Option<String>,

    /// Directory the files are saved into [default: downloads]
    #[arg(long, value_name = "DIR")]
    folder_path: Option<String>,

    /// Kind of element to harvest: image, audio or video [default: image]
    #[arg(long, value_name = "KIND")]
    element_tag: Option<ResourceKind>,

    /// Maximum requests per minute, page fetch included [default: 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    requests_per_minute: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of resources downloaded at the same time [default: 1]
    #[arg(long, value_name = "N")]
    max_concurrent_downloads: Option<u32>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Write a markdown run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Command-line values win over values from the configuration file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.website_url {
            config.target.website_url = Some(url.clone());
        }
        if let Some(folder) = &self.folder_path {
            config.target.folder_path = folder.clone();
        }
        if let Some(kind) = self.element_tag {
            config.target.element_tag = kind;
        }
        if let Some(rpm) = self.requests_per_minute {
            config.target.requests_per_minute = rpm;
        }
        if let Some(workers) = self.max_concurrent_downloads {
            config.download.max_concurrent_downloads = workers;
        }
        if let Some(timeout) = self.timeout_secs {
            config.http.timeout_secs = timeout;
        }
        if let Some(report) = &self.report {
            config.download.report_path = Some(report.display().to_string());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);

    let mut coordinator = match Coordinator::from_config(&config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            tracing::error!("Invalid settings: {}", e);
            return Err(e.into());
        }
    };

    // First Ctrl-C stops new downloads and abandons in-flight ones
    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            cancel.cancel();
        }
    });

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_summary(&report);
    }

    if let Some(path) = &config.download.report_path {
        write_markdown_report(&report, PathBuf::from(path).as_path())
            .with_context(|| format!("writing run report to {}", path))?;
        tracing::info!("Report written to: {}", path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("media_harvester=info,warn"),
            1 => EnvFilter::new("media_harvester=debug,info"),
            2 => EnvFilter::new("media_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
