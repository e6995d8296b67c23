//! Placeholder templates: literal text with `{{key}}` tokens, nothing else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

const STRATEGIC_DOCUMENT: &str = include_str!("../../templates/strategic_document.md");
const BUILDER_PROMPT: &str = include_str!("../../templates/builder_prompt.md");

/// Which key mapping a template draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    #[serde(alias = "strategic")]
    StrategicDocument,
    BuilderPrompt,
}

impl TemplateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::StrategicDocument => "strategic_document",
            TemplateKind::BuilderPrompt => "builder_prompt",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strategic" | "strategic_document" => Ok(TemplateKind::StrategicDocument),
            "builder_prompt" | "builder" => Ok(TemplateKind::BuilderPrompt),
            other => Err(Error::InvalidInput(format!("unknown template: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    kind: TemplateKind,
    segments: Vec<Segment>,
}

fn valid_key(key: &str) -> bool {
    key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Template {
    /// Parse `source` into literal and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` for an unclosed `{{`, an empty key, or a key
    /// containing anything other than ASCII letters, digits and `_`.
    pub fn parse(name: impl Into<String>, kind: TemplateKind, source: &str) -> Result<Self, Error> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                let offset = source.len() - rest.len() + start;
                return Err(Error::Template(format!("{name}: unclosed placeholder at byte {offset}")));
            };
            let key = after[..end].trim();
            if key.is_empty() {
                return Err(Error::Template(format!("{name}: empty placeholder")));
            }
            if !valid_key(key) {
                return Err(Error::Template(format!("{name}: invalid placeholder key {key:?}")));
            }
            segments.push(Segment::Placeholder(key.to_string()));
            rest = &after[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { name, kind, segments })
    }

    /// The template shipped with the crate for `kind`.
    pub fn builtin(kind: TemplateKind) -> Result<Self, Error> {
        let source = match kind {
            TemplateKind::StrategicDocument => STRATEGIC_DOCUMENT,
            TemplateKind::BuilderPrompt => BUILDER_PROMPT,
        };
        Self::parse(kind.as_str(), kind, source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder keys in first-appearance order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(key) = segment
                && !keys.contains(&key.as_str())
            {
                keys.push(key.as_str());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let template = Template::parse("t", TemplateKind::StrategicDocument, "Hi {{ site_url }}, {{x}}{{x}}!").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("Hi ".into()),
                Segment::Placeholder("site_url".into()),
                Segment::Literal(", ".into()),
                Segment::Placeholder("x".into()),
                Segment::Placeholder("x".into()),
                Segment::Literal("!".into()),
            ]
        );
        assert_eq!(template.placeholders(), vec!["site_url", "x"]);
    }

    #[test]
    fn test_parse_errors() {
        let kind = TemplateKind::StrategicDocument;
        assert!(matches!(Template::parse("t", kind, "a {{b"), Err(Error::Template(msg)) if msg.contains("unclosed")));
        assert!(matches!(Template::parse("t", kind, "a {{ }}"), Err(Error::Template(msg)) if msg.contains("empty")));
        assert!(matches!(Template::parse("t", kind, "{{a b}}"), Err(Error::Template(msg)) if msg.contains("invalid")));
    }

    #[test]
    fn test_literal_only() {
        let template = Template::parse("t", TemplateKind::BuilderPrompt, "no tokens } here {").unwrap();
        assert!(template.placeholders().is_empty());
    }

    #[test]
    fn test_builtins_parse() {
        for kind in [TemplateKind::StrategicDocument, TemplateKind::BuilderPrompt] {
            let template = Template::builtin(kind).unwrap();
            assert_eq!(template.name(), kind.as_str());
            assert!(!template.placeholders().is_empty());
        }
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("strategic".parse::<TemplateKind>().unwrap(), TemplateKind::StrategicDocument);
        assert_eq!("builder_prompt".parse::<TemplateKind>().unwrap(), TemplateKind::BuilderPrompt);
        assert!("pdf".parse::<TemplateKind>().is_err());
    }
}
