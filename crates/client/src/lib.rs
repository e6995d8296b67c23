//! Client code for sitebrief.
//!
//! This crate provides the network-facing half of an audit: HTTP page fetching
//! with robots.txt checks, structural extraction, the PageSpeed measurement
//! client, the performance fetcher and content scraper, the optional insight
//! collaborator, and the pipeline that joins them.

pub mod audit;
pub mod extract;
pub mod fetch;
pub mod insight;
pub mod pagespeed;
pub mod performance;
pub mod policy;
pub mod scrape;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{AuditOptions, AuditPipeline, AuditReport};
pub use extract::{extract_links, extract_page, extract_structured_data};
pub use fetch::{FetchClient, FetchConfig, FetchedPage, PageFetchError, PageFetcher};
pub use insight::{EndpointInsightProvider, InsightProvider};
pub use pagespeed::{MeasurementError, PageSpeedClient, PageSpeedConfig};
pub use performance::{MeasurementService, PerformanceFetcher};
pub use policy::{CachePolicy, RetryPolicy};
pub use scrape::ContentScraper;
