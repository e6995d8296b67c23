//! Cache and retry policies shared by the performance fetcher and scraper.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use sitebrief_core::AppConfig;

/// How a run treats cached inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Reuse fresh entries and store new results.
    #[default]
    Use,
    /// Ignore existing entries but store new results.
    Refresh,
}

impl CachePolicy {
    pub fn reads(self) -> bool {
        matches!(self, CachePolicy::Use)
    }
}

/// Exponential backoff for transient measurement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `2` means up to three calls.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, base_delay: Duration::from_secs(2) }
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self { max_retries: config.max_retries, base_delay: config.retry_base_delay() }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `attempt + 1` (0-indexed): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}
