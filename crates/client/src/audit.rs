//! Audit pipeline: URL → [performance ∥ scrape] → insight → merge → render.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use sitebrief_core::model::{AuditTarget, PageContent, PageRole, SiteProfile};
use sitebrief_core::{AppConfig, CacheDb, Document, Error, Template, TemplateKind, merge, render};

use crate::fetch::{FetchClient, FetchConfig};
use crate::insight::{EndpointInsightProvider, InsightProvider};
use crate::pagespeed::{PageSpeedClient, PageSpeedConfig};
use crate::performance::PerformanceFetcher;
use crate::policy::CachePolicy;
use crate::scrape::ContentScraper;

/// Per-run options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOptions {
    /// Roles to scrape; order does not matter.
    pub roles: Vec<PageRole>,
    pub template: TemplateKind,
    pub cache_policy: CachePolicy,
    /// Overrides the configured audit deadline.
    pub deadline: Option<Duration>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            roles: PageRole::ALL.to_vec(),
            template: TemplateKind::StrategicDocument,
            cache_policy: CachePolicy::Use,
            deadline: None,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub profile: SiteProfile,
    pub document: Document,
}

/// Orchestrates one audit end to end.
pub struct AuditPipeline {
    performance: PerformanceFetcher,
    scraper: ContentScraper,
    insight: Option<Arc<dyn InsightProvider>>,
    audit_deadline: Duration,
}

impl AuditPipeline {
    pub fn new(performance: PerformanceFetcher, scraper: ContentScraper, audit_deadline: Duration) -> Self {
        Self { performance, scraper, insight: None, audit_deadline }
    }

    pub fn with_insight(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.insight = Some(provider);
        self
    }

    /// Wire the production collaborators: PageSpeed, HTTP page fetching and,
    /// when configured, the insight endpoint.
    pub fn from_config(config: &AppConfig, cache: CacheDb) -> Result<Self, Error> {
        let pagespeed = PageSpeedClient::new(PageSpeedConfig::from(config))
            .map_err(|e| Error::HttpError(format!("failed to build PageSpeed client: {e}")))?;
        let fetch = FetchClient::new(FetchConfig::from(config))?;

        let performance = PerformanceFetcher::new(Arc::new(pagespeed), cache.clone(), config);
        let scraper = ContentScraper::new(Arc::new(fetch), cache, config);
        let pipeline = Self::new(performance, scraper, config.audit_deadline());

        Ok(match EndpointInsightProvider::from_config(config)? {
            Some(provider) => pipeline.with_insight(Arc::new(provider)),
            None => pipeline,
        })
    }

    /// Audit `url` with the built-in template selected by `options`.
    pub async fn run(&self, url: &str, options: &AuditOptions) -> Result<AuditReport, Error> {
        let template = Template::builtin(options.template)?;
        self.run_with_template(url, &template, options).await
    }

    /// Audit `url` and render `template`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidUrl` before any fetch when `url` does not normalize
    /// - `Error::AuditFailed` when neither a performance report nor a page was obtained
    /// - `Error::Template` when the template references unknown keys
    pub async fn run_with_template(
        &self,
        url: &str,
        template: &Template,
        options: &AuditOptions,
    ) -> Result<AuditReport, Error> {
        let target = AuditTarget::new(url)?;
        let start = Instant::now();
        let deadline = start + options.deadline.unwrap_or(self.audit_deadline);
        let policy = options.cache_policy;

        tracing::info!(url = %target.url(), template = template.name(), "starting audit");

        let (performance, scrape) = tokio::join!(
            self.performance.fetch_all(&target, policy, deadline),
            self.scraper.scrape(&target, &options.roles, policy, deadline),
        );

        let insight = match &self.insight {
            Some(provider) if scrape.has_ok_page() => {
                let pages: Vec<PageContent> = scrape.pages.values().filter(|page| page.is_ok()).cloned().collect();
                match tokio::time::timeout_at(deadline, provider.infer(target.url(), &pages)).await {
                    Ok(insight) => insight,
                    Err(_) => {
                        tracing::warn!(url = %target.url(), "audit deadline reached while waiting for insight");
                        None
                    }
                }
            }
            _ => None,
        };

        let profile = merge(target, performance, scrape, insight)?;
        let document = render(template, &profile)?;

        tracing::info!(
            url = %profile.target.url(),
            reports = profile.reports.len(),
            pages = profile.ok_pages().count(),
            gaps = profile.data_gaps.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "audit completed"
        );

        Ok(AuditReport { profile, document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PageFetchError;
    use crate::pagespeed::MeasurementError;
    use crate::testing::{ABOUT_HTML, HOME_HTML, SERVICES_HTML, StubFetcher, StubInsight, StubMeasurement};
    use sitebrief_core::NOT_AVAILABLE;
    use sitebrief_core::model::{BrandSource, Device, FetchStatus, Insight, PageState};

    fn config() -> AppConfig {
        AppConfig { scrape_delay_ms: 10, retry_base_delay_ms: 10, call_timeout_ms: 1_000, ..Default::default() }
    }

    async fn pipeline(measurement: StubMeasurement, fetcher: StubFetcher) -> AuditPipeline {
        let config = config();
        let cache = CacheDb::open_in_memory().await.unwrap();
        let performance = PerformanceFetcher::new(Arc::new(measurement), cache.clone(), &config);
        let scraper = ContentScraper::new(Arc::new(fetcher), cache, &config);
        AuditPipeline::new(performance, scraper, config.audit_deadline())
    }

    fn site() -> StubFetcher {
        StubFetcher::new()
            .with_page("/", HOME_HTML)
            .with_page("/about-us/", ABOUT_HTML)
            .with_page("/services.html", SERVICES_HTML)
            .with_status("/contact", 404)
    }

    #[tokio::test]
    async fn test_end_to_end_degraded_desktop() {
        let measurement = StubMeasurement::new()
            .with_score(Device::Mobile, 72)
            .failing(Device::Desktop, MeasurementError::Timeout);
        let pipeline = pipeline(measurement, site()).await;

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();
        let profile = &report.profile;

        assert_eq!(profile.target.url(), "https://example.com");
        assert_eq!(profile.scorecard(Device::Mobile).performance.to_string(), "72");
        assert_eq!(profile.scorecard(Device::Desktop).performance.to_string(), "N/A");
        assert_eq!(profile.pages.len(), 4);
        assert_eq!(profile.ok_pages().count(), 3);
        assert_eq!(profile.page_state(PageRole::Contact), PageState::Fetched(FetchStatus::NotFound));
        assert!(profile.data_gaps.contains(&"desktop performance fetch failed: timed out".to_string()));
        assert!(profile.data_gaps.contains(&"contact page not-found: HTTP 404".to_string()));

        let document = &report.document;
        assert_eq!(document.template, "strategic_document");
        assert_eq!(document.value("mobile_performance"), Some("72"));
        for key in ["desktop_performance", "desktop_seo", "desktop_accessibility", "desktop_best_practices"] {
            assert_eq!(document.value(key), Some(NOT_AVAILABLE), "{key}");
        }
        assert!(!document.text.contains("{{"));
    }

    #[tokio::test]
    async fn test_unreachable_measurement_keeps_api_key_out_of_report() {
        let config = config();
        let cache = CacheDb::open_in_memory().await.unwrap();
        let client = PageSpeedClient::new(PageSpeedConfig {
            api_key: Some("SECRET-KEY-123".to_string()),
            base_url: "http://127.0.0.1:1/v5".to_string(),
            ..Default::default()
        })
        .unwrap();
        let performance = PerformanceFetcher::new(Arc::new(client), cache.clone(), &config);
        let scraper = ContentScraper::new(Arc::new(site()), cache, &config);
        let pipeline = AuditPipeline::new(performance, scraper, config.audit_deadline());

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert!(report.profile.reports.is_empty());
        let profile = serde_json::to_string(&report.profile).unwrap();
        assert!(!profile.contains("SECRET-KEY-123"));
        assert!(!report.document.text.contains("SECRET-KEY-123"));
        assert!(
            report.profile.data_gaps.iter().any(|gap| gap.starts_with("mobile performance fetch failed") && gap.contains("refused")),
            "{:?}",
            report.profile.data_gaps
        );
    }

    #[tokio::test]
    async fn test_branches_run_concurrently() {
        let measurement = StubMeasurement::new()
            .with_latency(Device::Mobile, Duration::from_millis(400))
            .with_latency(Device::Desktop, Duration::from_millis(400));
        let fetcher = site().with_latency(Duration::from_millis(100));
        let pipeline = pipeline(measurement, fetcher).await;

        let start = Instant::now();
        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert_eq!(report.profile.reports.len(), 2);
        assert_eq!(report.profile.ok_pages().count(), 3);
        // sequential would be ≥ 400 + 4 × 100
        assert!(start.elapsed() < Duration::from_millis(750), "took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_performance_down_pages_up() {
        let measurement = StubMeasurement::new()
            .failing(Device::Mobile, MeasurementError::RateLimited)
            .failing(Device::Desktop, MeasurementError::HttpError { status: 500 });
        let pipeline = pipeline(measurement, site()).await;

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert!(report.profile.reports.is_empty());
        assert_eq!(report.document.value("mobile_performance"), Some(NOT_AVAILABLE));
        assert_eq!(report.document.value("home_title"), Some("Acme Cloud Software"));
    }

    #[tokio::test]
    async fn test_scrape_aborted_performance_up() {
        let fetcher = StubFetcher::new().unreachable("connection refused");
        let pipeline = pipeline(StubMeasurement::new(), fetcher).await;

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert_eq!(report.profile.reports.len(), 2);
        assert!(report.profile.data_gaps.contains(&"scrape of example.com aborted: connection refused".to_string()));
        for role in PageRole::ALL {
            assert_eq!(report.profile.page_state(role), PageState::Unreachable);
        }
    }

    #[tokio::test]
    async fn test_everything_down_fails_with_reasons() {
        let measurement = StubMeasurement::new()
            .failing(Device::Mobile, MeasurementError::RateLimited)
            .failing(Device::Desktop, MeasurementError::Timeout);
        let fetcher = StubFetcher::new().unreachable("connection refused");
        let pipeline = pipeline(measurement, fetcher).await;

        let err = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap_err();

        match err {
            Error::AuditFailed(reason) => {
                assert!(reason.contains("both performance fetches failed"));
                assert!(reason.contains("mobile: rate limited"));
                assert!(reason.contains("desktop: timed out"));
                assert!(reason.contains("scrape aborted: connection refused"));
            }
            other => panic!("expected AuditFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_fetching() {
        let pipeline = pipeline(StubMeasurement::new(), site()).await;
        let err = pipeline.run("ftp://example.com", &AuditOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_insight_applied_when_pages_available() {
        let insight = Insight { industry: Some("fintech".into()), ..Default::default() };
        let provider = Arc::new(StubInsight::new(Some(insight)));
        let pipeline = pipeline(StubMeasurement::new(), site()).await.with_insight(provider.clone());

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(report.profile.brand.industry, "fintech");
        assert_eq!(report.profile.brand.source, BrandSource::Inference);
        assert_eq!(report.document.value("industry"), Some("fintech"));
    }

    #[tokio::test]
    async fn test_insight_skipped_without_pages() {
        let provider = Arc::new(StubInsight::new(Some(Insight::default())));
        let fetcher = StubFetcher::new().with_error("/", PageFetchError::Timeout);
        let pipeline = pipeline(StubMeasurement::new(), fetcher).await.with_insight(provider.clone());

        let report = pipeline.run("https://example.com", &AuditOptions::default()).await.unwrap();

        assert_eq!(provider.calls(), 0);
        assert_eq!(report.profile.page_state(PageRole::Home), PageState::Fetched(FetchStatus::Timeout));
    }

    #[tokio::test]
    async fn test_builder_prompt_template() {
        let pipeline = pipeline(StubMeasurement::new().with_score(Device::Desktop, 64), site()).await;
        let options = AuditOptions { template: TemplateKind::BuilderPrompt, ..Default::default() };

        let report = pipeline.run("example.com", &options).await.unwrap();

        assert_eq!(report.document.template, "builder_prompt");
        assert_eq!(report.document.value("desktop_performance"), Some("64"));
        assert_eq!(report.document.value("site_url"), Some("https://example.com"));
    }

    #[tokio::test]
    async fn test_custom_template_with_unknown_key_is_fatal() {
        let pipeline = pipeline(StubMeasurement::new(), site()).await;
        let template = Template::parse("custom", TemplateKind::StrategicDocument, "{{site_url}} {{favorite_color}}").unwrap();

        let err = pipeline.run_with_template("https://example.com", &template, &AuditOptions::default()).await.unwrap_err();

        assert!(matches!(err, Error::Template(msg) if msg.contains("favorite_color")));
    }

    #[tokio::test]
    async fn test_audit_deadline_bounds_the_run() {
        let measurement = StubMeasurement::new()
            .with_latency(Device::Mobile, Duration::from_secs(30))
            .with_latency(Device::Desktop, Duration::from_secs(30));
        let pipeline = pipeline(measurement, site()).await;
        let options = AuditOptions { deadline: Some(Duration::from_millis(300)), ..Default::default() };

        let start = Instant::now();
        let report = pipeline.run("https://example.com", &options).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(report.profile.reports.is_empty());
        assert!(report.profile.data_gaps.contains(&"mobile performance fetch failed: audit deadline exceeded".to_string()));
        assert!(report.profile.page(PageRole::Home).is_some_and(|page| page.is_ok()));
    }
}
