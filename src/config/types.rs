use crate::config::validation::validate;
use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Browser-identifying user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/123.0.0.0 Safari/537.36 Edg/123.0.0.0";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default rate ceiling
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Default destination directory
pub const DEFAULT_FOLDER_PATH: &str = "downloads";

/// Main configuration structure for Media-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// What to harvest and where to put it
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Page to scan for resources
    #[serde(rename = "website-url", default)]
    pub website_url: Option<String>,

    /// Directory the resources are saved into (created if missing)
    #[serde(rename = "folder-path", default = "default_folder_path")]
    pub folder_path: String,

    /// Kind of resource to download
    #[serde(rename = "element-tag", default)]
    pub element_tag: ResourceKind,

    /// Maximum number of outbound requests per minute
    #[serde(rename = "requests-per-minute", default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            website_url: None,
            folder_path: default_folder_path(),
            element_tag: ResourceKind::default(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

/// HTTP request settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Value of the User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Download behavior settings
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Number of resources processed at once (1 = strictly sequential)
    #[serde(
        rename = "max-concurrent-downloads",
        default = "default_max_concurrent_downloads"
    )]
    pub max_concurrent_downloads: u32,

    /// Optional path of a markdown run report
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: default_max_concurrent_downloads(),
            report_path: None,
        }
    }
}

fn default_folder_path() -> String {
    DEFAULT_FOLDER_PATH.to_string()
}

fn default_requests_per_minute() -> u32 {
    DEFAULT_REQUESTS_PER_MINUTE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_concurrent_downloads() -> u32 {
    1
}

/// The category of embeddable media being harvested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    #[serde(alias = "img")]
    Image,
    Audio,
    Video,
}

impl ResourceKind {
    /// The markup tag carrying this kind of resource
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// The attribute holding the resource reference
    pub fn source_attribute(&self) -> &'static str {
        "src"
    }

    /// Plural noun used in log lines ("Downloading images from ...")
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Audio => "audio",
            Self::Video => "videos",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "img" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// The immutable description of one harvesting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Page whose resources are downloaded
    pub site_url: Url,

    /// Kind of resource to look for
    pub kind: ResourceKind,

    /// Directory the resources are written into
    pub destination_dir: PathBuf,

    /// Rate ceiling for all requests of the run, page fetch included
    pub requests_per_minute: NonZeroU32,
}

impl CrawlTarget {
    /// Builds a target from a configuration, validating it first
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlTarget)` - The configuration describes a runnable target
    /// * `Err(ConfigError)` - Validation failed or no website URL was given
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate(config)?;

        let raw_url = config.target.website_url.as_deref().ok_or_else(|| {
            ConfigError::Validation("website_url is required".to_string())
        })?;
        let site_url = Url::parse(raw_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid website_url: {}", e)))?;

        let requests_per_minute = NonZeroU32::new(config.target.requests_per_minute)
            .ok_or_else(|| {
                ConfigError::Validation("requests_per_minute must be positive".to_string())
            })?;

        Ok(Self {
            site_url,
            kind: config.target.element_tag,
            destination_dir: PathBuf::from(&config.target.folder_path),
            requests_per_minute,
        })
    }

    /// Minimum spacing between two consecutive requests
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(60) / self.requests_per_minute.get()
    }
}
