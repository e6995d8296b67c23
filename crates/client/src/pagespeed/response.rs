//! PageSpeed Insights (Lighthouse) response types and normalization.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use sitebrief_core::model::{CoreWebVitals, Device, Diagnostic, Impact, Opportunity, PerformanceReport, Scores};

use super::MeasurementError;

/// Audits reported as opportunities when they fail.
const OPPORTUNITY_AUDITS: &[&str] = &[
    "render-blocking-resources",
    "unused-css-rules",
    "unused-javascript",
    "modern-image-formats",
    "offscreen-images",
    "unminified-css",
    "unminified-javascript",
    "uses-text-compression",
    "uses-responsive-images",
    "efficient-animated-content",
    "prioritize-lcp-image",
    "uses-optimized-images",
];

/// Audits reported as diagnostics when they fail or are informative.
const DIAGNOSTIC_AUDITS: &[&str] = &[
    "mainthread-work-breakdown",
    "bootup-time",
    "uses-rel-preconnect",
    "font-display",
    "third-party-summary",
    "largest-contentful-paint-element",
    "total-byte-weight",
    "uses-long-cache-ttl",
];

/// Raw response from `runPagespeed`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedApiResponse {
    #[serde(default)]
    pub lighthouse_result: Option<LighthouseResult>,
    #[serde(default, rename = "analysisUTCTimestamp")]
    pub analysis_utc_timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    #[serde(default)]
    pub fetch_time: Option<String>,
    #[serde(default)]
    pub runtime_error: Option<RuntimeError>,
    #[serde(default)]
    pub categories: HashMap<String, Category>,
    #[serde(default)]
    pub audits: HashMap<String, Audit>,
}

/// Set by Lighthouse when the run itself was unreliable.
#[derive(Debug, Deserialize)]
pub struct RuntimeError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    #[serde(default)]
    pub title: String,
    pub score: Option<f64>,
    #[serde(default)]
    pub score_display_mode: Option<String>,
    #[serde(default)]
    pub display_value: Option<String>,
    pub numeric_value: Option<f64>,
    #[serde(default)]
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetails {
    pub overall_savings_ms: Option<f64>,
    pub overall_savings_bytes: Option<f64>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

fn to_score(category: Option<&Category>) -> Option<u8> {
    category.and_then(|c| c.score).map(|score| (score.clamp(0.0, 1.0) * 100.0).round() as u8)
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|v| DateTime::parse_from_rfc3339(v).ok()).map(|t| t.with_timezone(&Utc))
}

impl Audit {
    fn failed(&self) -> bool {
        self.score.is_some_and(|score| score < 1.0)
    }

    fn is_scored(&self) -> bool {
        !matches!(self.score_display_mode.as_deref(), Some("notApplicable" | "manual" | "error"))
    }
}

fn opportunities(audits: &HashMap<String, Audit>) -> Vec<Opportunity> {
    let mut found: Vec<Opportunity> = OPPORTUNITY_AUDITS
        .iter()
        .filter_map(|id| audits.get(*id).map(|audit| (*id, audit)))
        .filter(|(_, audit)| audit.is_scored() && audit.failed())
        .map(|(id, audit)| {
            let details = audit.details.as_ref();
            let savings_ms = details.and_then(|d| d.overall_savings_ms).unwrap_or(0.0).max(0.0);
            let savings_kib = details.and_then(|d| d.overall_savings_bytes).unwrap_or(0.0).max(0.0) / 1024.0;
            Opportunity {
                id: id.to_string(),
                title: audit.title.clone(),
                savings_ms,
                savings_kib,
                impact: Impact::from_savings(savings_ms, savings_kib),
            }
        })
        .collect();

    // Stable: equal impacts keep audit list order.
    found.sort_by(|a, b| b.impact.cmp(&a.impact));
    found
}

fn diagnostics(audits: &HashMap<String, Audit>) -> Vec<Diagnostic> {
    DIAGNOSTIC_AUDITS
        .iter()
        .filter_map(|id| audits.get(*id).map(|audit| (*id, audit)))
        .filter(|(_, audit)| {
            audit.is_scored() && (audit.failed() || audit.score_display_mode.as_deref() == Some("informative"))
        })
        .map(|(id, audit)| Diagnostic {
            id: id.to_string(),
            title: audit.title.clone(),
            detail: audit.display_value.clone().unwrap_or_default(),
        })
        .collect()
}

fn vitals(audits: &HashMap<String, Audit>) -> CoreWebVitals {
    let metric = |id: &str| audits.get(id).and_then(|audit| audit.numeric_value);
    CoreWebVitals {
        lcp_ms: metric("largest-contentful-paint"),
        fcp_ms: metric("first-contentful-paint"),
        tbt_ms: metric("total-blocking-time"),
        cls: metric("cumulative-layout-shift"),
        speed_index_ms: metric("speed-index"),
        tti_ms: metric("interactive"),
    }
}

impl PageSpeedApiResponse {
    /// Normalize the Lighthouse result into a report for `device`.
    pub fn into_report(self, device: Device) -> Result<PerformanceReport, MeasurementError> {
        let lighthouse = self
            .lighthouse_result
            .ok_or_else(|| MeasurementError::Parse("missing lighthouseResult".to_string()))?;

        let categories = &lighthouse.categories;
        let scores = Scores {
            performance: to_score(categories.get("performance")),
            seo: to_score(categories.get("seo")),
            accessibility: to_score(categories.get("accessibility")),
            best_practices: to_score(categories.get("best-practices")),
        };

        if let Some(err) = &lighthouse.runtime_error {
            tracing::warn!(device = %device, code = %err.code, message = %err.message, "Lighthouse flagged its run");
        }

        let fetched_at = parse_time(lighthouse.fetch_time.as_deref())
            .or_else(|| parse_time(self.analysis_utc_timestamp.as_deref()))
            .unwrap_or_else(Utc::now);

        Ok(PerformanceReport {
            device,
            scores,
            opportunities: opportunities(&lighthouse.audits),
            diagnostics: diagnostics(&lighthouse.audits),
            vitals: vitals(&lighthouse.audits),
            fetched_at,
            stale: lighthouse.runtime_error.is_some(),
        })
    }
}
