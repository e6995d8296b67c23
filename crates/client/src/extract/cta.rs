//! Call-to-action detection.
//!
//! A CTA is a `<button>`, a submit input, an anchor styled as a button
//! (`btn`, `button` or `cta` in its class list), or an anchor whose text reads
//! like an action ("Get started", "Book a demo", ...).

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

const MAX_CTAS: usize = 20;
const MAX_CTA_CHARS: usize = 60;

static CANDIDATES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("button, a[href], input[type=submit], input[type=button]").expect("invalid selector")
});

static ACTION_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(get started|start (now|today|free)|sign ?up|join|subscribe|book( a| your)?|schedule|request( a)?|get( a)? (quote|demo|estimate)|free (trial|consultation|quote)|try( it)?( for)? free|contact us|call (us|now|today)|buy|shop|order|donate|download|apply|register|learn more|talk to)\b",
    )
    .expect("invalid regex")
});

fn styled_as_button(element: &ElementRef<'_>) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_ascii_lowercase();
        class.contains("btn") || class.contains("button") || class.contains("cta")
    })
}

fn label(element: &ElementRef<'_>) -> String {
    let text = if element.value().name() == "input" {
        element.value().attr("value").unwrap_or_default().to_string()
    } else {
        element.text().collect::<Vec<_>>().join(" ")
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct CTA labels in document order.
pub fn extract_ctas(document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ctas = Vec::new();

    for element in document.select(&CANDIDATES) {
        let text = label(&element);
        if text.is_empty() || text.chars().count() > MAX_CTA_CHARS {
            continue;
        }

        let is_cta = match element.value().name() {
            "a" => styled_as_button(&element) || ACTION_TEXT.is_match(&text),
            _ => true,
        };
        if !is_cta || !seen.insert(text.to_lowercase()) {
            continue;
        }

        ctas.push(text);
        if ctas.len() >= MAX_CTAS {
            break;
        }
    }

    ctas
}
