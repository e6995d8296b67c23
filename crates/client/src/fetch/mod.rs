//! HTTP page fetching with robots.txt compliance.
//!
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//! - robots.txt fetched and cached per host (24h), evaluated for the
//!   configured User-Agent.
//!
//! Non-2xx responses are returned, not raised: the scraper records them as page
//! statuses. Only transport-level failures are errors.

pub mod robots;

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::{Duration, Instant};
use url::Url;

pub use robots::RobotsCache;

use sitebrief_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "sitebrief/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Per-page request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Whether to respect robots.txt (default: true)
    pub respect_robots: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "sitebrief/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10_000),
            max_redirects: 5,
            respect_robots: true,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.page_timeout(),
            respect_robots: config.respect_robots,
            ..Default::default()
        }
    }
}

/// A page response of any status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The final URL after redirects
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body text; empty for non-2xx responses.
    pub body: String,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }
}

/// Transport-level page fetch failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageFetchError {
    #[error("request timed out")]
    Timeout,

    /// The host could not be reached at all (DNS, refused, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("disallowed by robots.txt: {0}")]
    RobotsDisallowed(String),

    #[error("response too large: {0} bytes")]
    TooLarge(usize),

    #[error("{0}")]
    Other(String),
}

/// The innermost cause of a reqwest error, e.g. "connection refused".
///
/// The request URL is dropped first: it can carry credentials in its query.
pub(crate) fn root_cause(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut cause: &dyn std::error::Error = &err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    let message = cause.to_string();
    let message = message.split(" (os error").next().unwrap_or_default().trim();
    if message.is_empty() { err.to_string() } else { message.to_lowercase() }
}

impl From<reqwest::Error> for PageFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PageFetchError::Timeout
        } else if err.is_connect() {
            PageFetchError::Connect(root_cause(err))
        } else {
            PageFetchError::Other(root_cause(err))
        }
    }
}

/// Source of site pages; the scraper's only I/O seam.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageFetchError>;
}

/// HTTP fetch client with robots.txt checks.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    robots_cache: RobotsCache,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        let robots_cache = RobotsCache::new(config.user_agent.clone(), http.clone());

        Ok(Self { http, config, robots_cache })
    }

    async fn check_robots(&self, url: &Url) -> Result<(), PageFetchError> {
        if !self.config.respect_robots {
            return Ok(());
        }
        if self.robots_cache.is_allowed(url).await {
            Ok(())
        } else {
            Err(PageFetchError::RobotsDisallowed(url.path().to_string()))
        }
    }
}

#[async_trait]
impl PageFetcher for FetchClient {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageFetchError> {
        let start = Instant::now();
        self.check_robots(url).await?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "page fetch returned non-success status");
            return Ok(FetchedPage { url: final_url, status: status.as_u16(), content_type, body: String::new() });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(PageFetchError::TooLarge(len as usize));
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.config.max_bytes {
            return Err(PageFetchError::TooLarge(bytes.len()));
        }

        tracing::debug!(
            url = %url,
            final_url = %final_url,
            fetch_ms = start.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "fetched page"
        );

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
