//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

const MAX_BYTES_LIMIT: usize = 50 * 1024 * 1024;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MIN_TIMEOUT_MS: u64 = 100;

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.pagespeed_base_url.trim().is_empty() {
            return Err(invalid("pagespeed_base_url", "must not be empty"));
        }

        if !(1..=4).contains(&self.max_pages) {
            return Err(invalid("max_pages", "must be between 1 and 4"));
        }

        if self.scrape_delay_ms > 60_000 {
            return Err(invalid("scrape_delay_ms", "must not exceed 60000ms"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be at least 1 second"));
        }

        for (field, value) in [("call_timeout_ms", self.call_timeout_ms), ("page_timeout_ms", self.page_timeout_ms)] {
            if value < MIN_TIMEOUT_MS {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > MAX_TIMEOUT_MS {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.max_retries > 10 {
            return Err(invalid("max_retries", "must not exceed 10"));
        }

        if self.audit_deadline_ms < self.call_timeout_ms {
            return Err(invalid("audit_deadline_ms", "must be at least call_timeout_ms"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > MAX_BYTES_LIMIT {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if let Some(endpoint) = &self.insight_endpoint
            && url::Url::parse(endpoint).is_err()
        {
            return Err(invalid("insight_endpoint", "must be an absolute URL"));
        }

        if self.pagespeed_api_key.is_none() {
            tracing::warn!("No pagespeed_api_key configured; measurements use the shared public quota");
        }

        Ok(())
    }
}
