//! robots.txt compliance with caching.
//!
//! Fetches and caches robots.txt files per origin, respecting a 24-hour TTL.
//! A missing robots.txt (4xx) allows everything. An unreachable or oversized
//! one also allows everything, and that fallback is cached for a shorter TTL so
//! it is not re-requested for every page.

use robotstxt_rs::RobotsTxt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use super::root_cause;

/// Default TTL for robots.txt cache (24 hours).
const ROBOTS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL for the allow-all fallback after a failed robots.txt fetch.
const FAILURE_TTL: Duration = Duration::from_secs(10 * 60);

/// Maximum size of robots.txt to fetch (1MB).
const MAX_ROBOTS_SIZE: usize = 1024 * 1024;

/// Error type for robots.txt operations.
#[derive(Debug, thiserror::Error)]
pub enum RobotsError {
    #[error("failed to fetch robots.txt: {0}")]
    FetchError(String),

    #[error("robots.txt too large")]
    TooLarge,
}

struct CachedRobots {
    robots: RobotsTxt,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedRobots {
    fn new(robots: RobotsTxt, ttl: Duration) -> Self {
        Self { robots, fetched_at: Instant::now(), ttl }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// In-memory robots.txt cache keyed by origin.
pub struct RobotsCache {
    cache: Arc<RwLock<HashMap<String, CachedRobots>>>,
    user_agent: String,
    http: reqwest::Client,
}

impl RobotsCache {
    /// Create a cache that fetches through the given client.
    pub fn new(user_agent: String, http: reqwest::Client) -> Self {
        Self { cache: Arc::new(RwLock::new(HashMap::new())), user_agent, http }
    }

    fn robots_url(url: &Url) -> String {
        match url.port() {
            Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), url.host_str().unwrap_or(""), port),
            None => format!("{}://{}/robots.txt", url.scheme(), url.host_str().unwrap_or("")),
        }
    }

    /// Whether the configured user agent may fetch `url`.
    ///
    /// Fetches and caches robots.txt for the origin on a miss. A failed fetch
    /// is logged and treated as allow-all.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let robots_url = Self::robots_url(url);

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&robots_url)
                && !cached.is_expired()
            {
                let allowed = cached.robots.can_fetch(&self.user_agent, url.as_str());
                tracing::debug!(robots_url = %robots_url, allowed, "robots.txt cache hit");
                return allowed;
            }
        }

        let entry = match self.fetch_robots(&robots_url).await {
            Ok(robots) => CachedRobots::new(robots, ROBOTS_TTL),
            Err(e) => {
                tracing::warn!(robots_url = %robots_url, error = %e, "robots.txt unavailable, allowing all");
                CachedRobots::new(RobotsTxt::parse(""), FAILURE_TTL)
            }
        };
        let allowed = entry.robots.can_fetch(&self.user_agent, url.as_str());

        let mut cache = self.cache.write().await;
        cache.insert(robots_url, entry);

        allowed
    }

    async fn fetch_robots(&self, url: &str) -> Result<RobotsTxt, RobotsError> {
        let response = self.http.get(url).send().await.map_err(|e| RobotsError::FetchError(root_cause(e)))?;

        let status = response.status();
        if status.is_success() {
            if let Some(len) = response.content_length()
                && len as usize > MAX_ROBOTS_SIZE
            {
                return Err(RobotsError::TooLarge);
            }

            let bytes = response.bytes().await.map_err(|e| RobotsError::FetchError(root_cause(e)))?;

            if bytes.len() > MAX_ROBOTS_SIZE {
                return Err(RobotsError::TooLarge);
            }

            Ok(RobotsTxt::parse(&String::from_utf8_lossy(&bytes)))
        } else if status.is_client_error() {
            tracing::debug!(robots_url = %url, "robots.txt not found, allowing all");
            Ok(RobotsTxt::parse(""))
        } else {
            Err(RobotsError::FetchError(format!("status {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_robots_expiry() {
        let robots = RobotsTxt::parse("User-agent: *\nAllow: /");
        let mut cached = CachedRobots::new(robots, ROBOTS_TTL);
        assert!(!cached.is_expired());

        cached.fetched_at = Instant::now() - ROBOTS_TTL - Duration::from_secs(1);
        assert!(cached.is_expired());
    }

    #[test]
    fn test_robots_url_keeps_port() {
        let url = Url::parse("http://localhost:8080/about").unwrap();
        assert_eq!(RobotsCache::robots_url(&url), "http://localhost:8080/robots.txt");

        let url = Url::parse("https://example.com/contact?x=1").unwrap();
        assert_eq!(RobotsCache::robots_url(&url), "https://example.com/robots.txt");
    }

    #[tokio::test]
    async fn test_cache_hit_evaluates_rules() {
        let cache = RobotsCache::new("sitebrief/0.1".to_string(), reqwest::Client::new());
        cache.cache.write().await.insert(
            "https://example.com/robots.txt".to_string(),
            CachedRobots::new(RobotsTxt::parse("User-agent: *\nDisallow: /private"), ROBOTS_TTL),
        );

        let open = Url::parse("https://example.com/about").unwrap();
        let private = Url::parse("https://example.com/private/area").unwrap();
        assert!(cache.is_allowed(&open).await);
        assert!(!cache.is_allowed(&private).await);
    }

    #[tokio::test]
    async fn test_unreachable_robots_cached_as_allow_all() {
        let cache = RobotsCache::new("sitebrief/0.1".to_string(), reqwest::Client::new());
        let about = Url::parse("http://127.0.0.1:1/about").unwrap();
        let contact = Url::parse("http://127.0.0.1:1/contact").unwrap();

        assert!(cache.is_allowed(&about).await);

        {
            let entries = cache.cache.read().await;
            let entry = entries.get("http://127.0.0.1:1/robots.txt").expect("fallback should be cached");
            assert_eq!(entry.ttl, FAILURE_TTL);
        }
        // Served from the cached fallback.
        assert!(cache.is_allowed(&contact).await);
        assert_eq!(cache.cache.read().await.len(), 1);
    }
}
