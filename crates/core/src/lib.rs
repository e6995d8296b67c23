//! Core types and shared functionality for sitebrief.
//!
//! This crate provides:
//! - The audit data model and URL normalization
//! - Unified error types
//! - Configuration structures
//! - SQLite-backed cache for performance reports and scraped pages
//! - The insight merger and document renderer

pub mod cache;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod render;

pub use cache::{CacheCategory, CacheDb, CacheKey};
pub use config::AppConfig;
pub use error::{Error, FetchCause, FetchError, ScrapeAborted};
pub use merge::{PerformanceOutcome, ScrapeOutcome, merge};
pub use render::{Document, NOT_AVAILABLE, Template, TemplateKind, render};
