//! On-page SEO checks over scraped pages.

use crate::model::{AuditTarget, PageContent, PageRole, SeoFindings};

const MAX_META_DESCRIPTION: usize = 160;
const MAX_TITLE: usize = 60;

/// Check meta descriptions, the home title, H1 usage, image alt text,
/// canonical and language declarations, structured data and HTTPS.
///
/// Returns empty findings when no page was fetched; there is nothing to judge.
pub fn analyze(target: &AuditTarget, pages: &[&PageContent]) -> SeoFindings {
    let mut findings = SeoFindings::default();
    let Some(lead) = pages.iter().find(|page| page.role == PageRole::Home).or_else(|| pages.first()) else {
        return findings;
    };

    let description = lead.meta_description.trim();
    if description.is_empty() {
        findings.issues.push("Missing meta description".into());
    } else if description.chars().count() > MAX_META_DESCRIPTION {
        findings.issues.push(format!("Meta description too long (>{MAX_META_DESCRIPTION} characters)"));
    } else {
        findings.strengths.push("Meta description present and appropriate length".into());
    }

    let title = lead.title.trim();
    if title.is_empty() {
        findings.issues.push("Missing page title".into());
    } else if title.chars().count() > MAX_TITLE {
        findings.issues.push(format!("Page title too long (>{MAX_TITLE} characters)"));
    } else {
        findings.strengths.push("Page title present and appropriate length".into());
    }

    let h1_count: usize = pages.iter().map(|page| page.headings_at(1).count()).sum();
    if h1_count == 0 {
        findings.issues.push("No H1 tags found".into());
    } else if h1_count > pages.len() {
        findings.issues.push("Multiple H1 tags found on some pages".into());
    } else {
        findings.strengths.push("Appropriate H1 tag usage".into());
    }

    let missing_alt: usize = pages.iter().map(|page| page.images.iter().filter(|img| !img.has_alt).count()).sum();
    if missing_alt > 0 {
        findings.issues.push(format!("{missing_alt} images missing alt text"));
    } else {
        findings.strengths.push("All images have alt text".into());
    }

    if lead.canonical.as_deref().is_some_and(|url| !url.trim().is_empty()) {
        findings.strengths.push("Canonical URL declared".into());
    } else {
        findings.issues.push("Missing canonical URL".into());
    }

    if lead.lang.as_deref().is_some_and(|lang| !lang.trim().is_empty()) {
        findings.strengths.push("Page language declared".into());
    } else {
        findings.issues.push("Missing language declaration".into());
    }

    let mut schema_types: Vec<&str> = Vec::new();
    for kind in pages.iter().flat_map(|page| page.structured_data.iter()) {
        if !schema_types.contains(&kind.as_str()) {
            schema_types.push(kind);
        }
    }
    if schema_types.is_empty() {
        findings.issues.push("No structured data found".into());
    } else {
        findings.strengths.push(format!("Structured data present ({})", schema_types.join(", ")));
    }

    if target.is_https() || pages.iter().any(|page| page.url.starts_with("https://")) {
        findings.strengths.push("Site uses HTTPS".into());
    } else {
        findings.issues.push("Site not using HTTPS".into());
    }

    findings.recommendations = findings.issues.iter().filter_map(|issue| recommendation(issue)).map(String::from).collect();

    findings
}

fn recommendation(issue: &str) -> Option<&'static str> {
    let issue = issue.to_lowercase();
    if issue.contains("meta description") {
        Some("Add a compelling meta description of 150-160 characters that summarizes the page content")
    } else if issue.contains("title") {
        Some("Create descriptive, unique titles of 50-60 characters for each page")
    } else if issue.contains("h1") {
        Some("Use exactly one H1 tag per page that clearly describes the page content")
    } else if issue.contains("alt text") {
        Some("Add descriptive alt text to all images for better accessibility and SEO")
    } else if issue.contains("canonical") {
        Some("Declare a canonical URL on each page to consolidate duplicate content")
    } else if issue.contains("language") {
        Some("Set the lang attribute on the html element")
    } else if issue.contains("structured data") {
        Some("Add schema.org structured data (e.g. Organization, LocalBusiness) as JSON-LD")
    } else if issue.contains("https") {
        Some("Serve the site over HTTPS to improve security and search rankings")
    } else {
        None
    }
}
