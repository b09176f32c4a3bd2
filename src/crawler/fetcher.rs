//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of a run:
//! - Building one HTTP client with the identifying user agent and timeout
//! - Issuing single GET requests, never retried
//! - Classifying the outcome as success, non-success status or transport error

use crate::config::HttpConfig;
use reqwest::Client;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// 2xx response with its full body
    Success {
        /// HTTP status code
        status_code: u16,
        /// Response body bytes
        body: Vec<u8>,
    },

    /// Any status outside the success range (4xx, 5xx, unfollowed 3xx)
    NonSuccess {
        /// HTTP status code
        status_code: u16,
    },

    /// Timeout, DNS failure, refused connection, TLS failure or broken body
    TransportError {
        /// Error description
        cause: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - User agent and timeout settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use media_harvester::config::HttpConfig;
/// use media_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues single GET requests with a shared client
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and classifies the outcome
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 2xx, body read | `Success` |
    /// | Any other status | `NonSuccess` |
    /// | Timeout | `TransportError` |
    /// | Connection refused / DNS / TLS | `TransportError` |
    /// | Body read failure | `TransportError` |
    ///
    /// No retries are attempted.
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_transport_error(&e),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
            return FetchResult::NonSuccess {
                status_code: status.as_u16(),
            };
        }

        match response.bytes().await {
            Ok(body) => FetchResult::Success {
                status_code: status.as_u16(),
                body: body.to_vec(),
            },
            Err(e) => classify_transport_error(&e),
        }
    }
}

/// Maps a reqwest error to a transport error description
fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    let cause = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::TransportError { cause }
}
