//! Audit target and URL normalization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::Error;

/// URL normalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("unparseable URL: {0}")]
    Parse(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

/// Normalize a user-supplied site URL.
///
/// Defaults the scheme to `https`, lowercases the host, drops the fragment and
/// strips trailing slashes when there is no query string. Idempotent.
pub fn normalize(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let serialized = url.to_string();
    if url.query().is_some() {
        Ok(serialized)
    } else {
        Ok(serialized.trim_end_matches('/').to_string())
    }
}

/// The site under audit. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct AuditTarget {
    url: String,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    base: Url,
}

impl AuditTarget {
    /// Normalize `input` and stamp the creation time.
    pub fn new(input: &str) -> Result<Self, UrlError> {
        let url = normalize(input)?;
        let base = Url::parse(&url).map_err(|e| UrlError::Parse(e.to_string()))?;
        Ok(Self { url, created_at: Utc::now(), base })
    }

    /// Normalized URL string; also the cache key prefix.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    pub fn is_https(&self) -> bool {
        self.base.scheme() == "https"
    }

    /// Resolve a site-relative path (e.g. `/about`) against the site origin.
    pub fn join(&self, path: &str) -> Result<Url, UrlError> {
        self.base.join(path).map_err(|e| UrlError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults_scheme() {
        assert_eq!(normalize("example.com").unwrap(), "https://example.com");
    }

    #[test]
    fn test_normalize_strips_trailing_slash_and_fragment() {
        assert_eq!(normalize("https://Example.COM/").unwrap(), "https://example.com");
        assert_eq!(normalize("https://example.com/blog//#top").unwrap(), "https://example.com/blog");
    }

    #[test]
    fn test_normalize_keeps_query() {
        assert_eq!(normalize("http://example.com/?ref=a").unwrap(), "http://example.com/?ref=a");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert_eq!(normalize("   "), Err(UrlError::Empty));
        assert!(matches!(normalize("ftp://example.com"), Err(UrlError::UnsupportedScheme(s)) if s == "ftp"));
        assert!(matches!(normalize("https://"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "example.com",
            "  https://example.com/  ",
            "HTTP://Example.com/About/",
            "https://example.com/a/b/?q=1#frag",
            "example.com:8080/path/",
            "https://example.com/blog#x",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {input}");
        }
    }

    #[test]
    fn test_target_join() {
        let target = AuditTarget::new("https://example.com/").unwrap();
        assert_eq!(target.url(), "https://example.com");
        assert_eq!(target.host(), "example.com");
        assert!(target.is_https());
        assert_eq!(target.join("/about").unwrap().as_str(), "https://example.com/about");
    }
}
