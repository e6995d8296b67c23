//! Data model shared by the fetchers, the merger and the renderer.

mod insight;
mod page;
mod performance;
mod profile;
mod target;

pub use insight::Insight;
pub use page::{FetchStatus, Heading, Image, PageContent, PageRole};
pub use performance::{CoreWebVitals, Device, Diagnostic, Impact, Opportunity, PerformanceReport, Scores};
pub use profile::{BrandProfile, BrandSource, PageState, Score, ScoreCard, SeoFindings, SiteProfile, UNKNOWN};
pub use target::{AuditTarget, UrlError, normalize};
