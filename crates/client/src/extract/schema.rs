//! Schema.org types declared by a page, via JSON-LD or microdata.

use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("invalid selector"));
static ITEMTYPE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[itemtype]").expect("invalid selector"));

const MAX_TYPES: usize = 20;

fn push_unique(types: &mut Vec<String>, kind: &str) {
    let kind = kind.trim();
    if !kind.is_empty() && types.len() < MAX_TYPES && !types.iter().any(|t| t == kind) {
        types.push(kind.to_string());
    }
}

/// Collect `@type` values from a JSON-LD node, descending into arrays and `@graph`.
fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_types(item, types)),
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(kind)) => push_unique(types, kind),
                Some(Value::Array(kinds)) => kinds.iter().filter_map(Value::as_str).for_each(|kind| push_unique(types, kind)),
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, types);
            }
        }
        _ => {}
    }
}

/// Declared types in document order, deduplicated. Unparseable JSON-LD blocks are skipped.
pub fn extract_structured_data(document: &Html) -> Vec<String> {
    let mut types = Vec::new();

    for script in document.select(&JSON_LD) {
        let text = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::debug!(error = %e, "skipping malformed JSON-LD block"),
        }
    }

    for item in document.select(&ITEMTYPE) {
        for itemtype in item.value().attr("itemtype").unwrap_or_default().split_whitespace() {
            let kind = itemtype.trim_end_matches('/').rsplit('/').next().unwrap_or(itemtype);
            push_unique(&mut types, kind);
        }
    }

    types
}
