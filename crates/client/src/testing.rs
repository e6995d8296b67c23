//! Stub collaborators with fault toggles, for tests only.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use sitebrief_core::model::{Device, Insight, PageContent, PerformanceReport, Scores};

use crate::fetch::{FetchedPage, PageFetchError, PageFetcher};
use crate::insight::InsightProvider;
use crate::pagespeed::MeasurementError;
use crate::performance::MeasurementService;

/// Measurement service returning fixed scores, queued faults, or a permanent fault per device.
#[derive(Default)]
pub(crate) struct StubMeasurement {
    scores: HashMap<Device, u8>,
    permanent: HashMap<Device, MeasurementError>,
    queued: Mutex<HashMap<Device, VecDeque<MeasurementError>>>,
    latency: HashMap<Device, Duration>,
    stale: HashSet<Device>,
    calls: Mutex<Vec<(Device, Instant)>>,
}

impl StubMeasurement {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_score(mut self, device: Device, performance: u8) -> Self {
        self.scores.insert(device, performance);
        self
    }

    /// Every call for `device` fails with `err`.
    pub(crate) fn failing(mut self, device: Device, err: MeasurementError) -> Self {
        self.permanent.insert(device, err);
        self
    }

    /// The next calls for `device` fail with `errs`, in order, then succeed.
    pub(crate) fn failing_first(self, device: Device, errs: Vec<MeasurementError>) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.insert(device, errs.into());
        }
        self
    }

    pub(crate) fn with_latency(mut self, device: Device, latency: Duration) -> Self {
        self.latency.insert(device, latency);
        self
    }

    /// Reports for `device` come back marked stale.
    pub(crate) fn with_stale(mut self, device: Device) -> Self {
        self.stale.insert(device);
        self
    }

    pub(crate) fn calls(&self, device: Device) -> usize {
        self.calls.lock().unwrap().iter().filter(|(d, _)| *d == device).count()
    }

    pub(crate) fn call_times(&self, device: Device) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().filter(|(d, _)| *d == device).map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl MeasurementService for StubMeasurement {
    async fn measure(&self, _url: &str, device: Device) -> Result<PerformanceReport, MeasurementError> {
        self.calls.lock().unwrap().push((device, Instant::now()));

        if let Some(latency) = self.latency.get(&device) {
            tokio::time::sleep(*latency).await;
        }

        if let Some(err) = self.permanent.get(&device) {
            return Err(err.clone());
        }
        let queued = self.queued.lock().unwrap().get_mut(&device).and_then(VecDeque::pop_front);
        if let Some(err) = queued {
            return Err(err);
        }

        let performance = self.scores.get(&device).copied().unwrap_or(90);
        let mut report = PerformanceReport::new(
            device,
            Scores { performance: Some(performance), seo: Some(88), accessibility: Some(95), best_practices: Some(100) },
        );
        report.stale = self.stale.contains(&device);
        Ok(report)
    }
}

enum StubResponse {
    Page { status: u16, body: String },
    Error(PageFetchError),
}

/// Page fetcher serving canned responses by path; unknown paths are 404.
#[derive(Default)]
pub(crate) struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    unreachable: Option<String>,
    latency: Duration,
    requests: Mutex<Vec<(Url, Instant)>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, path: &str, html: &str) -> Self {
        self.responses.insert(path.to_string(), StubResponse::Page { status: 200, body: html.to_string() });
        self
    }

    pub(crate) fn with_status(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(path.to_string(), StubResponse::Page { status, body: String::new() });
        self
    }

    pub(crate) fn with_error(mut self, path: &str, err: PageFetchError) -> Self {
        self.responses.insert(path.to_string(), StubResponse::Error(err));
        self
    }

    /// Every request fails at the connection level.
    pub(crate) fn unreachable(mut self, cause: &str) -> Self {
        self.unreachable = Some(cause.to_string());
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn requests(&self) -> Vec<(Url, Instant)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requested_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url.path().to_string()).collect()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, PageFetchError> {
        self.requests.lock().unwrap().push((url.clone(), Instant::now()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(cause) = &self.unreachable {
            return Err(PageFetchError::Connect(cause.clone()));
        }

        match self.responses.get(url.path()) {
            Some(StubResponse::Page { status, body }) => Ok(FetchedPage {
                url: url.clone(),
                status: *status,
                content_type: Some("text/html".to_string()),
                body: body.clone(),
            }),
            Some(StubResponse::Error(err)) => Err(err.clone()),
            None => Ok(FetchedPage {
                url: url.clone(),
                status: 404,
                content_type: Some("text/html".to_string()),
                body: String::new(),
            }),
        }
    }
}

/// Inference collaborator returning a fixed insight.
pub(crate) struct StubInsight {
    insight: Option<Insight>,
    calls: AtomicUsize,
}

impl StubInsight {
    pub(crate) fn new(insight: Option<Insight>) -> Self {
        Self { insight, calls: AtomicUsize::new(0) }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightProvider for StubInsight {
    async fn infer(&self, _url: &str, _pages: &[PageContent]) -> Option<Insight> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.insight.clone()
    }
}

pub(crate) const HOME_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>Acme Cloud Software</title>
    <meta name="description" content="Cloud software that automates invoicing for small businesses.">
</head>
<body>
    <nav>
        <a href="/about-us/">About</a>
        <a href="/contact">Contact</a>
        <a href="/services.html">Services</a>
    </nav>
    <h1>Automate your invoicing</h1>
    <h2>Get paid faster with our platform</h2>
    <img src="/hero.png" alt="Dashboard screenshot">
    <a class="btn" href="/signup">Start free trial</a>
</body>
</html>
"#;

pub(crate) const ABOUT_HTML: &str = r#"
<html>
<head><title>About Acme</title><meta name="description" content="Our story and team."></head>
<body><h1>About us</h1><p>We build software for businesses.</p></body>
</html>
"#;

pub(crate) const SERVICES_HTML: &str = r#"
<html>
<head><title>Services</title><meta name="description" content="Invoicing, payments and reporting."></head>
<body><h1>Our services</h1><h2>Invoicing</h2><img src="/pay.png"></body>
</html>
"#;
