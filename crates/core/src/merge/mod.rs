//! Combines performance reports, scraped pages and an optional insight into a
//! [`SiteProfile`].
//!
//! Merging is pure: no I/O, no clocks. Missing inputs become recorded defaults
//! ("N/A" scores, unreachable roles, data gaps); the run fails only when there
//! is nothing at all to render.

use std::collections::BTreeMap;

use crate::error::{FetchError, ScrapeAborted};
use crate::model::{
    AuditTarget, BrandProfile, BrandSource, Device, Insight, PageContent, PageRole, PageState, PerformanceReport,
    ScoreCard, SiteProfile,
};
use crate::Error;

pub mod heuristics;
pub mod seo;

/// Result of the performance branch.
#[derive(Debug, Clone, Default)]
pub struct PerformanceOutcome {
    pub reports: Vec<PerformanceReport>,
    pub errors: Vec<FetchError>,
}

impl PerformanceOutcome {
    pub fn from_results(results: impl IntoIterator<Item = Result<PerformanceReport, FetchError>>) -> Self {
        let mut outcome = Self::default();
        for result in results {
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(err) => outcome.errors.push(err),
            }
        }
        outcome
    }

    fn error_for(&self, device: Device) -> Option<&FetchError> {
        self.errors.iter().find(|err| err.device == device)
    }
}

/// Result of the scrape branch.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub pages: BTreeMap<PageRole, PageContent>,
    pub aborted: Option<ScrapeAborted>,
}

impl ScrapeOutcome {
    pub fn has_ok_page(&self) -> bool {
        self.pages.values().any(PageContent::is_ok)
    }
}

/// Merge both branches and the optional insight into a renderable profile.
///
/// # Errors
///
/// Returns `Error::AuditFailed` naming every missing input when there is no
/// performance report and no successfully fetched page.
pub fn merge(
    target: AuditTarget,
    performance: PerformanceOutcome,
    scrape: ScrapeOutcome,
    insight: Option<Insight>,
) -> Result<SiteProfile, Error> {
    if performance.reports.is_empty() && !scrape.has_ok_page() {
        return Err(Error::AuditFailed(failure_reason(&performance, &scrape)));
    }

    let gaps = data_gaps(&performance, &scrape);

    let mut reports = BTreeMap::new();
    for report in performance.reports {
        reports.insert(report.device, report);
    }

    let scorecards = Device::ALL
        .iter()
        .map(|device| reports.get(device).map_or_else(|| ScoreCard::unavailable(*device), ScoreCard::from_report))
        .collect();

    let page_states = PageRole::ALL
        .iter()
        .map(|role| {
            let state = scrape.pages.get(role).map_or(PageState::Unreachable, |page| PageState::Fetched(page.status));
            (*role, state)
        })
        .collect();

    let ok_pages: Vec<&PageContent> = scrape.pages.values().filter(|page| page.is_ok()).collect();
    let mut brand = heuristics::infer_brand(&ok_pages);
    let seo = seo::analyze(&target, &ok_pages);

    let insight = insight.filter(|insight| !insight.is_empty());
    if let Some(insight) = &insight {
        apply_insight(&mut brand, insight);
    }

    tracing::debug!(
        url = %target.url(),
        reports = reports.len(),
        pages = scrape.pages.len(),
        gaps = gaps.len(),
        brand_source = ?brand.source,
        "Merged site profile"
    );

    Ok(SiteProfile {
        target,
        reports,
        scorecards,
        pages: scrape.pages,
        page_states,
        insight,
        brand,
        seo,
        data_gaps: gaps,
    })
}

/// Insight wins wherever it supplies a value.
fn apply_insight(brand: &mut BrandProfile, insight: &Insight) {
    let overrides = [
        (&mut brand.archetype, &insight.brand_archetype),
        (&mut brand.tone, &insight.tone),
        (&mut brand.target_audience, &insight.target_audience),
        (&mut brand.industry, &insight.industry),
    ];
    for (field, value) in overrides {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *field = value.to_string();
        }
    }
    if !insight.value_propositions.is_empty() {
        brand.value_propositions = insight.value_propositions.clone();
    }
    if !insight.conversion_elements.is_empty() {
        brand.conversion_elements = insight.conversion_elements.clone();
    }
    brand.source = BrandSource::Inference;
}

fn data_gaps(performance: &PerformanceOutcome, scrape: &ScrapeOutcome) -> Vec<String> {
    let mut gaps = Vec::new();

    for device in Device::ALL {
        if performance.reports.iter().any(|report| report.device == device) {
            continue;
        }
        match performance.error_for(device) {
            Some(err) => gaps.push(err.to_string()),
            None => gaps.push(format!("{device} performance report unavailable")),
        }
    }

    if let Some(aborted) = &scrape.aborted {
        gaps.push(aborted.to_string());
    }

    for role in PageRole::ALL {
        match scrape.pages.get(&role) {
            Some(page) if page.is_ok() => {}
            Some(page) => match &page.error {
                Some(error) => gaps.push(format!("{role} page {}: {error}", page.status)),
                None => gaps.push(format!("{role} page {}", page.status)),
            },
            None => gaps.push(format!("{role} page unreachable")),
        }
    }

    gaps
}

fn failure_reason(performance: &PerformanceOutcome, scrape: &ScrapeOutcome) -> String {
    let perf = if performance.errors.is_empty() {
        "no performance reports".to_string()
    } else {
        let causes: Vec<String> = performance.errors.iter().map(|err| format!("{}: {}", err.device, err.cause)).collect();
        let lead = if performance.errors.len() >= Device::ALL.len() {
            "both performance fetches failed"
        } else {
            "performance fetch failed"
        };
        format!("{lead} ({})", causes.join("; "))
    };

    let pages = if let Some(aborted) = &scrape.aborted {
        format!("no page content available (scrape aborted: {})", aborted.cause)
    } else if scrape.pages.is_empty() {
        "no page content available".to_string()
    } else {
        let statuses: Vec<String> =
            scrape.pages.values().map(|page| format!("{}: {}", page.role, page.status)).collect();
        format!("no page content available ({})", statuses.join("; "))
    };

    format!("{perf}; {pages}")
}
