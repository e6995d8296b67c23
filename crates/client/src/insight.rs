//! Optional inference collaborator.
//!
//! Any failure degrades to "no insight"; the merger then relies on
//! heuristics alone.

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

use sitebrief_core::model::{Insight, PageContent};
use sitebrief_core::{AppConfig, Error};

/// Produces a brand/market insight from scraped pages.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn infer(&self, url: &str, pages: &[PageContent]) -> Option<Insight>;
}

#[derive(Serialize)]
struct InsightRequest<'a> {
    url: &'a str,
    pages: &'a [PageContent],
}

/// Posts `{url, pages}` as JSON to an HTTP endpoint and expects an [`Insight`] body.
#[derive(Debug, Clone)]
pub struct EndpointInsightProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl EndpointInsightProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint: endpoint.into() })
    }

    /// Build a provider when `insight_endpoint` is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, Error> {
        config
            .insight_endpoint
            .as_deref()
            .map(|endpoint| Self::new(endpoint, config.call_timeout(), &config.user_agent))
            .transpose()
    }

    async fn request(&self, url: &str, pages: &[PageContent]) -> Result<Insight, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .json(&InsightRequest { url, pages })
            .send()
            .await?
            .error_for_status()?
            .json::<Insight>()
            .await
    }
}

#[async_trait]
impl InsightProvider for EndpointInsightProvider {
    async fn infer(&self, url: &str, pages: &[PageContent]) -> Option<Insight> {
        let start = Instant::now();
        match self.request(url, pages).await {
            Ok(insight) => {
                tracing::debug!(url, elapsed_ms = start.elapsed().as_millis() as u64, "insight received");
                Some(insight)
            }
            Err(e) => {
                tracing::warn!(url, endpoint = %self.endpoint, error = %e, "insight unavailable");
                None
            }
        }
    }
}
