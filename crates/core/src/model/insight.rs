//! Qualitative opinion produced by the inference collaborator.

use serde::{Deserialize, Serialize};

/// Structured opinion about a site. Every field is optional; absent fields
/// leave the heuristic value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insight {
    pub brand_archetype: Option<String>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    pub industry: Option<String>,
    pub value_propositions: Vec<String>,
    pub conversion_elements: Vec<String>,
}

impl Insight {
    pub fn is_empty(&self) -> bool {
        self.brand_archetype.is_none()
            && self.tone.is_none()
            && self.target_audience.is_none()
            && self.industry.is_none()
            && self.value_propositions.is_empty()
            && self.conversion_elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_deserializes() {
        let insight: Insight = serde_json::from_str(r#"{"industry": "legal", "tone": "formal"}"#).unwrap();
        assert_eq!(insight.industry.as_deref(), Some("legal"));
        assert!(insight.brand_archetype.is_none());
        assert!(insight.value_propositions.is_empty());
        assert!(!insight.is_empty());
    }

    #[test]
    fn test_empty_insight() {
        assert!(Insight::default().is_empty());
    }
}
