//! Role → URL resolution against the fixed candidate table.

use url::Url;

use sitebrief_core::model::{AuditTarget, PageRole, UrlError};

const IGNORED_SUFFIXES: [&str; 3] = [".html", ".htm", ".php"];

/// Lowercase, drop one page suffix and any trailing slash.
fn comparable_path(path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    let trimmed = lower.trim_end_matches('/');
    let stem = IGNORED_SUFFIXES.iter().find_map(|suffix| trimmed.strip_suffix(suffix)).unwrap_or(trimmed);
    let stem = stem.trim_end_matches('/');
    if stem.is_empty() { "/".to_string() } else { stem.to_string() }
}

/// URL to fetch for `role`.
///
/// When the home page's internal links are known, the highest-priority
/// candidate that appears among them wins and the link's own URL is used.
/// Otherwise the first candidate is joined onto the target.
pub fn resolve_role_url(role: PageRole, target: &AuditTarget, home_links: Option<&[String]>) -> Result<Url, UrlError> {
    let candidates = role.candidates();

    if let Some(links) = home_links {
        let parsed: Vec<Url> = links.iter().filter_map(|link| Url::parse(link).ok()).collect();
        for candidate in candidates {
            if let Some(link) = parsed.iter().find(|link| comparable_path(link.path()) == *candidate) {
                return Ok(link.clone());
            }
        }
    }

    target.join(candidates.first().copied().unwrap_or("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> AuditTarget {
        AuditTarget::new("https://example.com").unwrap()
    }

    #[test]
    fn test_comparable_path() {
        assert_eq!(comparable_path("/About-Us/"), "/about-us");
        assert_eq!(comparable_path("/services.html"), "/services");
        assert_eq!(comparable_path("/contact.php"), "/contact");
        assert_eq!(comparable_path("/"), "/");
        assert_eq!(comparable_path("/index.htm"), "/index");
    }

    #[test]
    fn test_fallback_to_first_candidate() {
        let url = resolve_role_url(PageRole::About, &target(), None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");

        let url = resolve_role_url(PageRole::Home, &target(), Some(&[])).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_best_priority_link_wins() {
        let links = vec![
            "https://example.com/our-story".to_string(),
            "https://example.com/About-Us/".to_string(),
            "https://example.com/blog".to_string(),
        ];
        let url = resolve_role_url(PageRole::About, &target(), Some(&links)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/About-Us/");
    }

    #[test]
    fn test_suffixed_link_matches() {
        let links = vec!["https://example.com/what-we-do.html".to_string()];
        let url = resolve_role_url(PageRole::Services, &target(), Some(&links)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/what-we-do.html");
    }

    #[test]
    fn test_unmatched_links_fall_back() {
        let links = vec!["https://example.com/pricing".to_string()];
        let url = resolve_role_url(PageRole::Contact, &target(), Some(&links)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/contact");
    }
}
