//! Link harvesting and same-site filtering.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector"));

/// Extract link targets from a parsed document, resolving relative URLs against `base_url`.
///
/// Only http(s) targets are kept. Fragments are dropped before de-duplication,
/// so `/about` and `/about#team` yield one link.
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(mut resolved) = base_url.join(href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);

        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Whether `href` points at the same site as `base_url` (a leading `www.` is ignored).
pub fn is_internal(href: &str, base_url: &Url) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };
    match (url.host_str(), base_url.host_str()) {
        (Some(a), Some(b)) => bare_host(a).eq_ignore_ascii_case(bare_host(b)),
        _ => false,
    }
}

/// Links that stay on the site of `base_url`.
pub fn internal_links(links: &[String], base_url: &Url) -> Vec<String> {
    links.iter().filter(|href| is_internal(href, base_url)).cloned().collect()
}

/// Links that leave the site of `base_url`.
pub fn external_links(links: &[String], base_url: &Url) -> Vec<String> {
    links.iter().filter(|href| !is_internal(href, base_url)).cloned().collect()
}
