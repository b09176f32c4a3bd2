use crate::config::types::{Config, DownloadConfig, HttpConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the download worker pool
const MAX_CONCURRENT_DOWNLOADS: u32 = 64;

/// Validates the entire configuration
///
/// A missing website URL is not an error here; it is only required once the
/// configuration is turned into a [`CrawlTarget`](crate::config::CrawlTarget).
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_http_config(&config.http)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates the harvesting target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    if let Some(website_url) = &config.website_url {
        validate_website_url(website_url)?;
    }

    if config.folder_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "folder_path cannot be empty".to_string(),
        ));
    }

    if config.requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be >= 1, got {}",
            config.requests_per_minute
        )));
    }

    Ok(())
}

/// Validates HTTP request settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates download settings
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_downloads < 1
        || config.max_concurrent_downloads > MAX_CONCURRENT_DOWNLOADS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_downloads must be between 1 and {}, got {}",
            MAX_CONCURRENT_DOWNLOADS, config.max_concurrent_downloads
        )));
    }

    if let Some(report_path) = &config.report_path {
        if report_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// The page URL must be absolute and fetchable over HTTP(S)
fn validate_website_url(website_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(website_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid website_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "website_url '{}' must use http or https",
            website_url
        )));
    }

    Ok(())
}
