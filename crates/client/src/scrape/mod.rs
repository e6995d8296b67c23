//! Content scraper: a single sequential loop over the requested roles.
//!
//! Roles are fetched in canonical order (home, about, contact, services),
//! truncated to `max_pages`. Fetches to one host are spaced by the politeness
//! delay; cache hits skip both the fetch and the delay. A connection-level
//! failure on the first role aborts the rest of the scrape. Hitting the audit
//! deadline marks the role in flight as timed out and leaves the remaining
//! roles unreachable.

mod politeness;
mod resolve;

pub use politeness::Politeness;
pub use resolve::resolve_role_url;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use sitebrief_core::model::{AuditTarget, FetchStatus, PageContent, PageRole};
use sitebrief_core::{AppConfig, CacheDb, CacheKey, ScrapeAborted, ScrapeOutcome};

use crate::extract::extract_page;
use crate::fetch::{FetchedPage, PageFetchError, PageFetcher};
use crate::policy::CachePolicy;

const DEADLINE_MESSAGE: &str = "audit deadline exceeded";

fn status_for(err: &PageFetchError) -> FetchStatus {
    match err {
        PageFetchError::Timeout => FetchStatus::Timeout,
        PageFetchError::RobotsDisallowed(_) => FetchStatus::Blocked,
        PageFetchError::Connect(_) | PageFetchError::TooLarge(_) | PageFetchError::Other(_) => FetchStatus::Failed,
    }
}

fn page_from_response(role: PageRole, fetched: FetchedPage) -> PageContent {
    let status = FetchStatus::from_http_status(fetched.status);
    if status != FetchStatus::Ok {
        return PageContent::failed(role, fetched.url.as_str(), status, format!("HTTP {}", fetched.status));
    }
    if !fetched.is_html() {
        let content_type = fetched.content_type.unwrap_or_default();
        return PageContent::failed(
            role,
            fetched.url.as_str(),
            FetchStatus::Failed,
            format!("unsupported content type: {content_type}"),
        );
    }
    extract_page(role, &fetched.url, &fetched.body)
}

/// Fetches and extracts the fixed set of site pages.
pub struct ContentScraper {
    fetcher: Arc<dyn PageFetcher>,
    cache: CacheDb,
    politeness: Politeness,
    max_pages: usize,
    ttl: Duration,
}

impl ContentScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: CacheDb, config: &AppConfig) -> Self {
        Self {
            fetcher,
            cache,
            politeness: Politeness::new(config.scrape_delay()),
            max_pages: config.max_pages,
            ttl: config.cache_ttl(),
        }
    }

    async fn cached(&self, key: &CacheKey, policy: CachePolicy) -> Option<PageContent> {
        if !policy.reads() {
            return None;
        }
        match self.cache.get::<PageContent>(key).await {
            Ok(Some(entry)) => {
                tracing::debug!(key = %key, "page cache hit");
                Some(entry.value)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "page cache read failed");
                None
            }
        }
    }

    /// Scrape `roles` of `target`.
    pub async fn scrape(
        &self,
        target: &AuditTarget,
        roles: &[PageRole],
        policy: CachePolicy,
        deadline: Instant,
    ) -> ScrapeOutcome {
        let mut selected: Vec<PageRole> = PageRole::ALL.into_iter().filter(|role| roles.contains(role)).collect();
        selected.truncate(self.max_pages);

        let start = Instant::now();
        let mut outcome = ScrapeOutcome::default();
        let mut home_links: Option<Vec<String>> = None;

        for (index, role) in selected.into_iter().enumerate() {
            let url = match resolve::resolve_role_url(role, target, home_links.as_deref()) {
                Ok(url) => url,
                Err(e) => {
                    outcome.pages.insert(role, PageContent::failed(role, target.url(), FetchStatus::Failed, e.to_string()));
                    continue;
                }
            };

            let key = CacheKey::new(target.url(), role);
            if let Some(page) = self.cached(&key, policy).await {
                if role == PageRole::Home {
                    home_links = Some(page.internal_links.clone());
                }
                outcome.pages.insert(role, page);
                continue;
            }

            if !self.politeness.acquire(target.host(), deadline).await {
                tracing::warn!(url = %url, role = %role, "audit deadline reached during politeness delay");
                outcome.pages.insert(role, PageContent::failed(role, url.as_str(), FetchStatus::Timeout, DEADLINE_MESSAGE));
                break;
            }

            let fetch_start = Instant::now();
            let page = match tokio::time::timeout_at(deadline, self.fetcher.fetch_page(&url)).await {
                Err(_) => {
                    tracing::warn!(url = %url, role = %role, "audit deadline reached during page fetch");
                    outcome.pages.insert(role, PageContent::failed(role, url.as_str(), FetchStatus::Timeout, DEADLINE_MESSAGE));
                    break;
                }
                Ok(Err(PageFetchError::Connect(cause))) if index == 0 => {
                    let aborted = ScrapeAborted { host: target.host().to_string(), cause };
                    tracing::warn!(url = %url, error = %aborted, "host unreachable, skipping remaining pages");
                    outcome.aborted = Some(aborted);
                    break;
                }
                Ok(Err(err)) => PageContent::failed(role, url.as_str(), status_for(&err), err.to_string()),
                Ok(Ok(fetched)) => page_from_response(role, fetched),
            };

            tracing::debug!(
                url = %url,
                role = %role,
                status = %page.status,
                fetch_ms = fetch_start.elapsed().as_millis() as u64,
                "scraped page"
            );

            if page.is_ok() {
                if role == PageRole::Home {
                    home_links = Some(page.internal_links.clone());
                }
                if let Err(e) = self.cache.put(&key, &page, self.ttl).await {
                    tracing::warn!(key = %key, error = %e, "failed to cache page");
                }
            }
            outcome.pages.insert(role, page);
        }

        tracing::info!(
            url = %target.url(),
            pages = outcome.pages.len(),
            ok = outcome.pages.values().filter(|page| page.is_ok()).count(),
            aborted = outcome.aborted.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scrape finished"
        );

        outcome
    }
}
