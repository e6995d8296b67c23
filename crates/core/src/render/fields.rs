//! Deterministic key → value mappings from a [`SiteProfile`].
//!
//! A `None` value means the profile has nothing for that key; the renderer
//! substitutes the sentinel.

use std::collections::BTreeMap;

use super::template::TemplateKind;
use crate::model::{BrandSource, Device, Impact, PageContent, PageRole, PerformanceReport, Score, SiteProfile, UNKNOWN};

pub type FieldMap = BTreeMap<&'static str, Option<String>>;

const DEVICE_KEYS: [(Device, [&str; 10]); 2] = [
    (
        Device::Mobile,
        [
            "mobile_performance",
            "mobile_seo",
            "mobile_accessibility",
            "mobile_best_practices",
            "mobile_opportunities",
            "mobile_diagnostics",
            "mobile_lcp",
            "mobile_cls",
            "mobile_tbt",
            "mobile_fetched_at",
        ],
    ),
    (
        Device::Desktop,
        [
            "desktop_performance",
            "desktop_seo",
            "desktop_accessibility",
            "desktop_best_practices",
            "desktop_opportunities",
            "desktop_diagnostics",
            "desktop_lcp",
            "desktop_cls",
            "desktop_tbt",
            "desktop_fetched_at",
        ],
    ),
];

const BUILDER_PROMPT_KEYS: &[&str] = &[
    "site_url",
    "home_title",
    "industry",
    "target_audience",
    "brand_archetype",
    "brand_tone",
    "value_propositions",
    "conversion_elements",
    "primary_ctas",
    "mobile_performance",
    "desktop_performance",
    "performance_issues",
    "seo_issues",
    "recommendations",
    "page_coverage",
];

const MAX_OPPORTUNITIES: usize = 5;
const MAX_DIAGNOSTICS: usize = 5;

/// Field mapping for one template variant.
pub fn fields_for(kind: TemplateKind, profile: &SiteProfile) -> FieldMap {
    let all = all_fields(profile);
    match kind {
        TemplateKind::StrategicDocument => all,
        TemplateKind::BuilderPrompt => all.into_iter().filter(|(key, _)| BUILDER_PROMPT_KEYS.contains(key)).collect(),
    }
}

fn bullets<S: AsRef<str>>(items: &[S]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(items.iter().map(|item| format!("- {}", item.as_ref())).collect::<Vec<_>>().join("\n"))
}

fn known(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && !value.eq_ignore_ascii_case(UNKNOWN)).then(|| value.to_string())
}

fn score(value: Option<u8>) -> String {
    Score(value).to_string()
}

fn millis(value: Option<f64>) -> Option<String> {
    value.map(|ms| if ms >= 1000.0 { format!("{:.1} s", ms / 1000.0) } else { format!("{ms:.0} ms") })
}

fn device_fields(fields: &mut FieldMap, keys: &[&'static str; 10], report: Option<&PerformanceReport>) {
    let Some(report) = report else {
        for key in keys {
            fields.insert(*key, None);
        }
        return;
    };

    let opportunities = if report.opportunities.is_empty() {
        "No significant opportunities detected".to_string()
    } else {
        report
            .opportunities
            .iter()
            .take(MAX_OPPORTUNITIES)
            .map(|opp| format!("- {} ({} impact, {})", opp.title, opp.impact.as_str(), opp.estimated_savings()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let diagnostics = if report.diagnostics.is_empty() {
        "No diagnostics reported".to_string()
    } else {
        report
            .diagnostics
            .iter()
            .take(MAX_DIAGNOSTICS)
            .map(|diag| {
                if diag.detail.is_empty() { format!("- {}", diag.title) } else { format!("- {}: {}", diag.title, diag.detail) }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut fetched_at = report.fetched_at.format("%Y-%m-%d %H:%M UTC").to_string();
    if report.stale {
        fetched_at.push_str(" (flagged stale by the measurement service)");
    }

    let values = [
        Some(score(report.scores.performance)),
        Some(score(report.scores.seo)),
        Some(score(report.scores.accessibility)),
        Some(score(report.scores.best_practices)),
        Some(opportunities),
        Some(diagnostics),
        millis(report.vitals.lcp_ms),
        report.vitals.cls.map(|cls| format!("{cls:.3}")),
        millis(report.vitals.tbt_ms),
        Some(fetched_at),
    ];
    for (key, value) in keys.iter().zip(values) {
        fields.insert(*key, value);
    }
}

fn page_coverage(profile: &SiteProfile) -> String {
    let fetched: Vec<&str> = profile.ok_pages().map(|page| page.role.as_str()).collect();
    if fetched.is_empty() {
        format!("0 of {} pages fetched", PageRole::ALL.len())
    } else {
        format!("{} of {} pages fetched ({})", fetched.len(), PageRole::ALL.len(), fetched.join(", "))
    }
}

fn heading_outline(page: &PageContent) -> Option<String> {
    let lines: Vec<String> = page
        .headings
        .iter()
        .filter(|h| h.level <= 3)
        .map(|h| format!("{}- H{}: {}", "  ".repeat(usize::from(h.level.saturating_sub(1))), h.level, h.text))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn high_impact_issues(profile: &SiteProfile) -> Vec<String> {
    let mut issues = Vec::new();
    for report in profile.reports.values() {
        for opp in report.opportunities.iter().filter(|opp| opp.impact >= Impact::Medium) {
            issues.push(format!("{} on {} ({})", opp.title, report.device, opp.estimated_savings()));
        }
    }
    issues
}

fn all_fields(profile: &SiteProfile) -> FieldMap {
    let mut fields = FieldMap::new();

    fields.insert("site_url", Some(profile.target.url().to_string()));
    fields.insert("audit_date", Some(profile.target.created_at().format("%Y-%m-%d").to_string()));
    fields.insert("page_coverage", Some(page_coverage(profile)));

    for (device, keys) in &DEVICE_KEYS {
        device_fields(&mut fields, keys, profile.report(*device));
    }

    let home = profile.page(PageRole::Home).filter(|page| page.is_ok());
    fields.insert("home_title", home.and_then(|page| known(&page.title)));
    fields.insert("home_meta_description", home.and_then(|page| known(&page.meta_description)));
    fields.insert("heading_outline", home.and_then(heading_outline));
    fields.insert("primary_ctas", home.and_then(|page| bullets(&page.ctas)));

    let ok_pages: Vec<&PageContent> = profile.ok_pages().collect();
    if ok_pages.is_empty() {
        fields.insert("image_count", None);
        fields.insert("images_missing_alt", None);
    } else {
        let images = ok_pages.iter().map(|page| page.images.len()).sum::<usize>();
        let missing = ok_pages.iter().flat_map(|page| &page.images).filter(|img| !img.has_alt).count();
        fields.insert("image_count", Some(images.to_string()));
        fields.insert("images_missing_alt", Some(missing.to_string()));
    }

    let brand = &profile.brand;
    fields.insert("brand_archetype", known(&brand.archetype));
    fields.insert("brand_tone", known(&brand.tone));
    fields.insert("target_audience", known(&brand.target_audience));
    fields.insert("industry", known(&brand.industry));
    fields.insert("value_propositions", bullets(&brand.value_propositions));
    fields.insert("conversion_elements", bullets(&brand.conversion_elements));
    fields.insert(
        "brand_source",
        Some(
            match brand.source {
                BrandSource::Heuristic => "keyword heuristics over scraped content",
                BrandSource::Inference => "inference service",
                BrandSource::Absent => "none",
            }
            .to_string(),
        ),
    );

    let issues = high_impact_issues(profile);
    fields.insert("performance_issues", bullets(&issues));

    if ok_pages.is_empty() {
        fields.insert("seo_issues", None);
        fields.insert("seo_strengths", None);
    } else {
        fields.insert("seo_issues", bullets(&profile.seo.issues).or_else(|| Some("No issues detected".into())));
        fields.insert("seo_strengths", bullets(&profile.seo.strengths));
    }

    let mut recommendations = profile.seo.recommendations.clone();
    recommendations.extend(issues.iter().map(|issue| format!("Fix: {issue}")));
    fields.insert("recommendations", bullets(&recommendations));

    fields.insert(
        "data_gaps",
        Some(bullets(&profile.data_gaps).unwrap_or_else(|| "None: every input was collected".to_string())),
    );

    fields
}
