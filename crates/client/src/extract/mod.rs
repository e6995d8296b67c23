//! Structural extraction from fetched HTML.
//!
//! Extraction is best-effort: malformed markup yields whatever html5ever
//! recovers, and every missing element comes back empty rather than as an
//! error.
//!
//! ### Extracted fields
//! - `<title>` and meta description (falling back to `og:description`)
//! - h1-h6 headings in document order
//! - images with resolved `src` and whether they carry alt text
//! - call-to-action labels (see [`cta`])
//! - same-site and off-site links (see [`links`])
//! - `<html lang>` and the canonical URL
//! - schema.org types from JSON-LD and microdata (see [`schema`])
//! - visible word count, ignoring `head`, `script`, `style`, `noscript` and `template`

pub mod cta;
pub mod links;
pub mod schema;

pub use cta::extract_ctas;
pub use links::{external_links, extract_links, internal_links, is_internal};
pub use schema::extract_structured_data;

use scraper::{Html, Selector};
use sitebrief_core::model::{FetchStatus, Heading, Image, PageContent, PageRole};
use std::sync::LazyLock;
use url::Url;

const MAX_IMAGES: usize = 200;
const MAX_HEADINGS: usize = 100;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"], meta[name="Description"]"#).expect("invalid selector"));
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).expect("invalid selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("invalid selector"));
static IMAGES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("invalid selector"));
static HTML: LazyLock<Selector> = LazyLock::new(|| Selector::parse("html").expect("invalid selector"));
static CANONICAL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel~="canonical"][href]"#).expect("invalid selector"));

const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template"];

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse)
        .find(|content| !content.is_empty())
}

fn headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADINGS)
        .filter_map(|el| {
            let level = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            let text = collapse(&el.text().collect::<Vec<_>>().join(" "));
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .take(MAX_HEADINGS)
        .collect()
}

fn images(document: &Html, base_url: &Url) -> Vec<Image> {
    document
        .select(&IMAGES)
        .filter_map(|el| {
            let attrs = el.value();
            let src = attrs.attr("src").or_else(|| attrs.attr("data-src"))?.trim();
            if src.is_empty() {
                return None;
            }
            let src = base_url.join(src).map_or_else(|_| src.to_string(), |url| url.to_string());
            let has_alt = attrs.attr("alt").is_some_and(|alt| !alt.trim().is_empty());
            Some(Image { src, has_alt })
        })
        .take(MAX_IMAGES)
        .collect()
}

fn lang(document: &Html) -> Option<String> {
    document
        .select(&HTML)
        .filter_map(|el| el.value().attr("lang"))
        .map(str::trim)
        .find(|lang| !lang.is_empty())
        .map(String::from)
}

fn canonical(document: &Html, base_url: &Url) -> Option<String> {
    let href = document.select(&CANONICAL).filter_map(|el| el.value().attr("href")).map(str::trim).next()?;
    if href.is_empty() {
        return None;
    }
    Some(base_url.join(href).map_or_else(|_| href.to_string(), |url| url.to_string()))
}

fn word_count(document: &Html) -> usize {
    document
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| ancestor.value().as_element().is_some_and(|el| HIDDEN.contains(&el.name())))
        })
        .map(|(_, text)| text.split_whitespace().count())
        .sum()
}

/// Extract page content for `role` from the HTML served at `page_url`.
pub fn extract_page(role: PageRole, page_url: &Url, html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()))
        .unwrap_or_default();
    let meta_description = meta_content(&document, &META_DESCRIPTION)
        .or_else(|| meta_content(&document, &OG_DESCRIPTION))
        .unwrap_or_default();

    let links = extract_links(&document, page_url);

    PageContent {
        html_length: html.len(),
        title,
        meta_description,
        headings: headings(&document),
        images: images(&document, page_url),
        ctas: extract_ctas(&document),
        internal_links: internal_links(&links, page_url),
        external_links: external_links(&links, page_url),
        lang: lang(&document),
        canonical: canonical(&document, page_url),
        structured_data: extract_structured_data(&document),
        word_count: word_count(&document),
        ..PageContent::empty(role, page_url.as_str(), FetchStatus::Ok)
    }
}
