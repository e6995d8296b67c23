//! Google PageSpeed Insights API client.
//!
//! ### API
//!
//! - **Endpoint**: `https://www.googleapis.com/pagespeedonline/v5/runPagespeed`
//! - **Authentication**: optional `key` query parameter; without one the
//!   public (low) quota applies.
//! - **Strategy**: one call per device (`strategy=mobile|desktop`), requesting
//!   the performance, accessibility, best-practices and seo categories.
//! - **Normalization**: converts the Lighthouse result into a stable
//!   `PerformanceReport`.
//!
//! Retries live in the performance fetcher, not here: one call is one attempt.

pub mod error;
pub mod response;

pub use error::MeasurementError;
pub use response::PageSpeedApiResponse;

use async_trait::async_trait;
use reqwest::header;
use std::time::{Duration, Instant};

use sitebrief_core::AppConfig;
use sitebrief_core::model::{Device, PerformanceReport};

use crate::fetch::root_cause;
use crate::performance::MeasurementService;

/// Default base URL for the PageSpeed Insights API.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/pagespeedonline/v5";

/// Default request timeout. Lighthouse runs routinely take 15-30s.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "sitebrief/0.1";

const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

/// PageSpeed client configuration.
#[derive(Debug, Clone)]
pub struct PageSpeedConfig {
    /// Optional API key.
    pub api_key: Option<String>,
    /// Base URL (default: https://www.googleapis.com/pagespeedonline/v5).
    pub base_url: String,
    /// Per-call timeout (default: 60s).
    pub timeout: Duration,
    /// User-agent string (default: sitebrief/0.1).
    pub user_agent: String,
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for PageSpeedConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.pagespeed_api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: config.pagespeed_base_url.trim_end_matches('/').to_string(),
            timeout: config.call_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// PageSpeed Insights API client.
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    http: reqwest::Client,
    config: PageSpeedConfig,
}

impl PageSpeedClient {
    /// Create a new PageSpeed client with the given configuration.
    pub fn new(config: PageSpeedConfig) -> Result<Self, MeasurementError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| MeasurementError::Network(root_cause(e)))?;

        Ok(Self { http, config })
    }

    /// Query parameters for one run. Categories repeat, as the API expects.
    fn query(&self, url: &str, device: Device) -> Vec<(&'static str, String)> {
        let mut params = vec![("url", url.to_string()), ("strategy", device.as_str().to_string())];
        params.extend(CATEGORIES.iter().map(|category| ("category", category.to_string())));
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        params
    }

    /// Run one Lighthouse measurement of `url` for `device`.
    pub async fn run(&self, url: &str, device: Device) -> Result<PerformanceReport, MeasurementError> {
        let start = Instant::now();
        let endpoint = format!("{}/runPagespeed", self.config.base_url);

        tracing::debug!(url, device = %device, "requesting PageSpeed run");

        let http_response = self
            .http
            .get(&endpoint)
            .header(header::ACCEPT, "application/json")
            .query(&self.query(url, device))
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(device = %device, status = status.as_u16(), "PageSpeed response status");

        if status == 401 || status == 403 {
            return Err(MeasurementError::AuthError);
        }

        if status == 429 {
            return Err(MeasurementError::RateLimited);
        }

        if status == 400 {
            let bytes = http_response.bytes().await?;
            let message = serde_json::from_slice::<response::ApiErrorResponse>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).chars().take(200).collect());
            return Err(MeasurementError::InvalidRequest(message));
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(MeasurementError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let api_response: PageSpeedApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| MeasurementError::Parse(e.to_string()))?;
        let report = api_response.into_report(device)?;

        tracing::debug!(
            device = %device,
            elapsed_ms = start.elapsed().as_millis() as u64,
            performance = ?report.scores.performance,
            "PageSpeed run completed"
        );

        Ok(report)
    }
}

#[async_trait]
impl MeasurementService for PageSpeedClient {
    async fn measure(&self, url: &str, device: Device) -> Result<PerformanceReport, MeasurementError> {
        self.run(url, device).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitebrief_core::FetchCause;

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig {
            pagespeed_api_key: Some("  ".to_string()),
            pagespeed_base_url: "http://localhost:9000/v5/".to_string(),
            call_timeout_ms: 5_000,
            ..Default::default()
        };
        let config = PageSpeedConfig::from(&app);
        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, "http://localhost:9000/v5");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_query_params() {
        let client = PageSpeedClient::new(PageSpeedConfig { api_key: Some("k".into()), ..Default::default() }).unwrap();
        let params = client.query("https://example.com", Device::Desktop);

        assert_eq!(params[0], ("url", "https://example.com".to_string()));
        assert_eq!(params[1], ("strategy", "desktop".to_string()));
        assert_eq!(params.iter().filter(|(name, _)| *name == "category").count(), 4);
        assert_eq!(params.last(), Some(&("key", "k".to_string())));
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        let config = PageSpeedConfig {
            api_key: Some("SECRET-KEY-123".into()),
            base_url: "http://127.0.0.1:1/v5".into(),
            ..Default::default()
        };
        let client = PageSpeedClient::new(config).unwrap();

        let err = client.run("https://example.com", Device::Mobile).await.unwrap_err();

        let MeasurementError::Network(cause) = &err else {
            panic!("expected a network error, got {err:?}");
        };
        assert!(cause.contains("refused"), "{cause}");
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!FetchCause::from(&err).to_string().contains("runPagespeed"));
    }

    #[test]
    fn test_query_without_key() {
        let client = PageSpeedClient::new(PageSpeedConfig::default()).unwrap();
        let params = client.query("https://example.com", Device::Mobile);
        assert!(params.iter().all(|(name, _)| *name != "key"));
    }
}
