//! Application configuration with layered loading.
//!
//! Loading precedence (highest wins):
//!
//! 1. Environment variables (SITEBRIEF_*)
//! 2. TOML config file (if SITEBRIEF_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Audit pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for page and robots.txt requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// PageSpeed Insights API key. Without one the public quota applies.
    #[serde(default)]
    pub pagespeed_api_key: Option<String>,

    #[serde(default = "default_pagespeed_base_url")]
    pub pagespeed_base_url: String,

    /// Number of page roles scraped, in canonical order (1..=4).
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Minimum delay between two page fetches to the same host.
    #[serde(default = "default_scrape_delay_ms")]
    pub scrape_delay_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Timeout of a single measurement call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Timeout of a single page fetch.
    #[serde(default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    /// Retries after the first measurement attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Wall-clock budget for one whole audit run.
    #[serde(default = "default_audit_deadline_ms")]
    pub audit_deadline_ms: u64,

    /// Maximum bytes to read per page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    #[serde(default = "default_true")]
    pub respect_robots: bool,

    /// Optional inference service that turns scraped pages into an `Insight`.
    #[serde(default)]
    pub insight_endpoint: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sitebrief-cache.sqlite")
}

fn default_user_agent() -> String {
    "sitebrief/0.1".into()
}

fn default_pagespeed_base_url() -> String {
    "https://www.googleapis.com/pagespeedonline/v5".into()
}

fn default_max_pages() -> usize {
    4
}

fn default_scrape_delay_ms() -> u64 {
    1_000
}

fn default_cache_ttl_secs() -> u64 {
    6 * 60 * 60
}

fn default_call_timeout_ms() -> u64 {
    60_000
}

fn default_page_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    2_000
}

fn default_audit_deadline_ms() -> u64 {
    180_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            pagespeed_api_key: None,
            pagespeed_base_url: default_pagespeed_base_url(),
            max_pages: default_max_pages(),
            scrape_delay_ms: default_scrape_delay_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            call_timeout_ms: default_call_timeout_ms(),
            page_timeout_ms: default_page_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            audit_deadline_ms: default_audit_deadline_ms(),
            max_bytes: default_max_bytes(),
            respect_robots: true,
            insight_endpoint: None,
        }
    }
}

impl AppConfig {
    pub fn scrape_delay(&self) -> Duration {
        Duration::from_millis(self.scrape_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn audit_deadline(&self) -> Duration {
        Duration::from_millis(self.audit_deadline_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SITEBRIEF_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SITEBRIEF_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./sitebrief-cache.sqlite"));
        assert_eq!(config.user_agent, "sitebrief/0.1");
        assert_eq!(config.max_pages, 4);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_bytes, 5_242_880);
        assert!(config.respect_robots);
        assert!(config.pagespeed_api_key.is_none());
        assert!(config.insight_endpoint.is_none());
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(config.scrape_delay(), Duration::from_secs(1));
        assert_eq!(config.cache_ttl(), Duration::from_secs(21_600));
        assert_eq!(config.call_timeout(), Duration::from_secs(60));
        assert_eq!(config.audit_deadline(), Duration::from_secs(180));
    }

    #[test]
    fn test_toml_and_env_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("sitebrief.toml", "max_pages = 2\nscrape_delay_ms = 250\n")?;
            jail.set_env("SITEBRIEF_CONFIG_FILE", "sitebrief.toml");
            jail.set_env("SITEBRIEF_SCRAPE_DELAY_MS", "500");
            jail.set_env("SITEBRIEF_PAGESPEED_API_KEY", "test-key");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.max_pages, 2);
            assert_eq!(config.scrape_delay_ms, 500);
            assert_eq!(config.pagespeed_api_key.as_deref(), Some("test-key"));
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SITEBRIEF_MAX_PAGES", "9");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "max_pages"));
            Ok(())
        });
    }
}
