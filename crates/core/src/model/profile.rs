//! The merged, renderable representation of one audited site.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{AuditTarget, Device, FetchStatus, Insight, PageContent, PageRole, PerformanceReport};

/// Placeholder for brand fields nothing could determine.
pub const UNKNOWN: &str = "unknown";

/// A 0–100 score or "N/A" when the report is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Score(pub Option<u8>);

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("N/A"),
        }
    }
}

/// Scores for one device, present whether or not that device was measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub device: Device,
    pub performance: Score,
    pub seo: Score,
    pub accessibility: Score,
    pub best_practices: Score,
}

impl ScoreCard {
    pub fn unavailable(device: Device) -> Self {
        Self {
            device,
            performance: Score::default(),
            seo: Score::default(),
            accessibility: Score::default(),
            best_practices: Score::default(),
        }
    }

    pub fn from_report(report: &PerformanceReport) -> Self {
        Self {
            device: report.device,
            performance: Score(report.scores.performance),
            seo: Score(report.scores.seo),
            accessibility: Score(report.scores.accessibility),
            best_practices: Score(report.scores.best_practices),
        }
    }
}

/// What happened to a role during the scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "status", rename_all = "lowercase")]
pub enum PageState {
    Fetched(FetchStatus),
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandSource {
    Heuristic,
    Inference,
    #[serde(rename = "none")]
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandProfile {
    pub archetype: String,
    pub tone: String,
    pub target_audience: String,
    pub industry: String,
    pub value_propositions: Vec<String>,
    pub conversion_elements: Vec<String>,
    pub source: BrandSource,
}

impl Default for BrandProfile {
    fn default() -> Self {
        Self {
            archetype: UNKNOWN.into(),
            tone: UNKNOWN.into(),
            target_audience: UNKNOWN.into(),
            industry: UNKNOWN.into(),
            value_propositions: Vec::new(),
            conversion_elements: Vec::new(),
            source: BrandSource::Absent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeoFindings {
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Aggregate handed to the document renderer.
#[derive(Debug, Clone, Serialize)]
pub struct SiteProfile {
    pub target: AuditTarget,
    pub reports: BTreeMap<Device, PerformanceReport>,
    pub scorecards: Vec<ScoreCard>,
    pub pages: BTreeMap<PageRole, PageContent>,
    pub page_states: BTreeMap<PageRole, PageState>,
    pub insight: Option<Insight>,
    pub brand: BrandProfile,
    pub seo: SeoFindings,
    pub data_gaps: Vec<String>,
}

impl SiteProfile {
    pub fn report(&self, device: Device) -> Option<&PerformanceReport> {
        self.reports.get(&device)
    }

    pub fn page(&self, role: PageRole) -> Option<&PageContent> {
        self.pages.get(&role)
    }

    pub fn scorecard(&self, device: Device) -> ScoreCard {
        self.scorecards
            .iter()
            .find(|card| card.device == device)
            .cloned()
            .unwrap_or_else(|| ScoreCard::unavailable(device))
    }

    pub fn page_state(&self, role: PageRole) -> PageState {
        self.page_states.get(&role).copied().unwrap_or(PageState::Unreachable)
    }

    /// Pages that were fetched successfully, in canonical role order.
    pub fn ok_pages(&self) -> impl Iterator<Item = &PageContent> {
        self.pages.values().filter(|page| page.is_ok())
    }
}
