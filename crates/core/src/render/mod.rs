//! Single-pass placeholder substitution from a [`SiteProfile`].
//!
//! Every placeholder must be a key the template's variant knows about;
//! unknown keys fail before any output is produced. Known keys without a
//! value resolve to [`NOT_AVAILABLE`]. Substituted values are never rescanned.

use serde::Serialize;

use crate::Error;
use crate::model::SiteProfile;

mod fields;
mod template;

pub use fields::{FieldMap, fields_for};
pub use template::{Template, TemplateKind};

use template::Segment;

/// Value substituted for placeholders the profile cannot resolve.
pub const NOT_AVAILABLE: &str = "Not available";

/// A rendered template.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub template: String,
    /// `(key, value)` pairs in first-appearance order.
    pub entries: Vec<(String, String)>,
    pub text: String,
}

impl Document {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Render `template` against `profile`.
///
/// # Errors
///
/// Returns `Error::Template` naming every placeholder the template's variant
/// has no mapping for.
pub fn render(template: &Template, profile: &SiteProfile) -> Result<Document, Error> {
    let fields = fields_for(template.kind(), profile);
    render_fields(template, &fields)
}

fn render_fields(template: &Template, fields: &FieldMap) -> Result<Document, Error> {
    let placeholders = template.placeholders();

    let unknown: Vec<&str> = placeholders.iter().copied().filter(|key| !fields.contains_key(*key)).collect();
    if !unknown.is_empty() {
        return Err(Error::Template(format!(
            "{}: unknown placeholder(s) for {}: {}",
            template.name(),
            template.kind(),
            unknown.join(", ")
        )));
    }

    let resolve = |key: &str| -> String {
        fields
            .get(key)
            .and_then(|value| value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    let entries: Vec<(String, String)> = placeholders.iter().map(|key| (key.to_string(), resolve(key))).collect();

    let mut text = String::new();
    for segment in template.segments() {
        match segment {
            Segment::Literal(literal) => text.push_str(literal),
            Segment::Placeholder(key) => {
                if let Some((_, value)) = entries.iter().find(|(k, _)| k == key) {
                    text.push_str(value);
                }
            }
        }
    }

    let unresolved = entries.iter().filter(|(_, value)| value == NOT_AVAILABLE).count();
    tracing::debug!(
        template = template.name(),
        placeholders = entries.len(),
        unresolved,
        "Rendered document"
    );

    Ok(Document { template: template.name().to_string(), entries, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{PerformanceOutcome, ScrapeOutcome, merge};
    use crate::model::{AuditTarget, Device, PerformanceReport, Scores};

    fn field_map(pairs: &[(&'static str, Option<&str>)]) -> FieldMap {
        pairs.iter().map(|(key, value)| (*key, value.map(String::from))).collect()
    }

    #[test]
    fn test_render_totality() {
        let template = Template::parse("t", TemplateKind::StrategicDocument, "A={{a}} B={{b}} C={{c}}").unwrap();
        let fields = field_map(&[("a", Some("1")), ("b", Some("2")), ("c", None)]);

        let doc = render_fields(&template, &fields).unwrap();

        assert_eq!(doc.text, "A=1 B=2 C=Not available");
        assert_eq!(
            doc.entries,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), NOT_AVAILABLE.to_string()),
            ]
        );
        assert!(!doc.text.contains("{{"));
    }

    #[test]
    fn test_unknown_placeholder_fails_fast() {
        let template = Template::parse("t", TemplateKind::StrategicDocument, "{{a}} {{nope}} {{zzz}}").unwrap();
        let fields = field_map(&[("a", Some("1"))]);

        let err = render_fields(&template, &fields).unwrap_err();
        assert!(matches!(err, Error::Template(msg) if msg.contains("nope, zzz")));
    }

    #[test]
    fn test_single_pass_substitution() {
        let template = Template::parse("t", TemplateKind::StrategicDocument, "{{a}}|{{b}}").unwrap();
        let fields = field_map(&[("a", Some("{{b}}")), ("b", Some("x"))]);

        let doc = render_fields(&template, &fields).unwrap();
        assert_eq!(doc.text, "{{b}}|x");
    }

    #[test]
    fn test_blank_value_gets_sentinel() {
        let template = Template::parse("t", TemplateKind::StrategicDocument, "[{{a}}]").unwrap();
        let fields = field_map(&[("a", Some("   "))]);
        assert_eq!(render_fields(&template, &fields).unwrap().text, "[Not available]");
    }

    #[test]
    fn test_builtin_templates_render_from_profile() {
        let report = PerformanceReport::new(Device::Mobile, Scores { performance: Some(72), ..Default::default() });
        let profile = merge(
            AuditTarget::new("https://example.com").unwrap(),
            PerformanceOutcome { reports: vec![report], errors: Vec::new() },
            ScrapeOutcome::default(),
            None,
        )
        .unwrap();

        for kind in [TemplateKind::StrategicDocument, TemplateKind::BuilderPrompt] {
            let doc = render(&Template::builtin(kind).unwrap(), &profile).unwrap();
            assert!(!doc.text.is_empty());
            assert!(!doc.text.contains("{{"));
            assert_eq!(doc.value("mobile_performance"), Some("72"));
            assert_eq!(doc.value("desktop_performance"), Some(NOT_AVAILABLE));
            assert_eq!(doc.value("site_url"), Some("https://example.com"));
        }
    }

    #[test]
    fn test_builder_prompt_rejects_strategic_only_keys() {
        let template = Template::parse("custom", TemplateKind::BuilderPrompt, "{{mobile_diagnostics}}").unwrap();
        let profile = merge(
            AuditTarget::new("https://example.com").unwrap(),
            PerformanceOutcome {
                reports: vec![PerformanceReport::new(Device::Desktop, Scores::default())],
                errors: Vec::new(),
            },
            ScrapeOutcome::default(),
            None,
        )
        .unwrap();
        assert!(matches!(render(&template, &profile), Err(Error::Template(_))));
    }
}
