//! SQLite-backed cache for performance reports and scraped pages.
//!
//! Entries are keyed by `(normalized url, category)` and carry their own
//! expiry. Access goes through tokio-rusqlite, which serializes statements on a
//! background thread, so callers share a [`CacheDb`] without extra locking.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheEntry, CacheStats};
pub use key::{CacheCategory, CacheKey};
