//! HTTP fetch capability for wgcrawl
//!
//! The crawl pipeline only depends on the [`Fetcher`] trait. [`HttpFetcher`]
//! is the reqwest-backed implementation used in production.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{CrawlError, Result};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
            accept_language: "de-DE,de;q=0.9,en;q=0.8".to_string(),
        }
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Something that can turn a URL into an HTML body
///
/// Implementations must tolerate concurrent use from several tasks.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches the page at `url` and returns its body
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed [`Fetcher`]
///
/// Wraps one pooled `reqwest::Client`, so a single instance is shared by
/// every detail fetch of a crawl.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let accept_language = config
            .accept_language
            .parse()
            .map_err(|_| {
                CrawlError::InvalidConfig(format!(
                    "invalid Accept-Language header: {:?}",
                    config.accept_language
                ))
            })?;
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, accept_language);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(CrawlError::HttpError)?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    /// Fetch HTML content from an absolute URL
    ///
    /// # Errors
    /// - `InvalidUrl` - URL is not absolute
    /// - `HttpError` - Network errors, including the per-request timeout
    /// - `NotFound` - Server returned 404
    /// - `HttpStatus` - Any other non-success status
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| CrawlError::InvalidUrl(format!("{url}: {e}")))?;
        debug!(url = %parsed, "Fetching page");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(CrawlError::HttpError)?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CrawlError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(CrawlError::HttpError)
    }
}
