//! Performance fetcher: cache-first measurement per device with retry/backoff.
//!
//! Each device is fetched independently. Transient failures (timeout, 429,
//! 5xx, network) are retried with exponential backoff; anything else fails on
//! the first attempt. Every call and backoff sleep is also bounded by the
//! audit deadline.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use sitebrief_core::model::{AuditTarget, Device, PerformanceReport};
use sitebrief_core::{AppConfig, CacheDb, CacheKey, FetchCause, FetchError, PerformanceOutcome};

use crate::pagespeed::MeasurementError;
use crate::policy::{CachePolicy, RetryPolicy};

/// An external service that measures one page for one device.
#[async_trait]
pub trait MeasurementService: Send + Sync {
    async fn measure(&self, url: &str, device: Device) -> Result<PerformanceReport, MeasurementError>;
}

/// Fetches performance reports through the cache.
#[derive(Clone)]
pub struct PerformanceFetcher {
    service: Arc<dyn MeasurementService>,
    cache: CacheDb,
    retry: RetryPolicy,
    call_timeout: Duration,
    ttl: Duration,
}

impl PerformanceFetcher {
    pub fn new(service: Arc<dyn MeasurementService>, cache: CacheDb, config: &AppConfig) -> Self {
        Self {
            service,
            cache,
            retry: RetryPolicy::from(config),
            call_timeout: config.call_timeout(),
            ttl: config.cache_ttl(),
        }
    }

    /// Fetch the report for one device.
    ///
    /// A fresh, non-stale cache entry is returned without calling the service.
    /// Only successful, non-stale reports are written back.
    pub async fn fetch(
        &self,
        target: &AuditTarget,
        device: Device,
        policy: CachePolicy,
        deadline: Instant,
    ) -> Result<PerformanceReport, FetchError> {
        let key = CacheKey::new(target.url(), device);

        if policy.reads() {
            match self.cache.get::<PerformanceReport>(&key).await {
                Ok(Some(entry)) if !entry.value.stale => {
                    tracing::debug!(key = %key, fetched_at = %entry.fetched_at, "performance cache hit");
                    return Ok(entry.value);
                }
                Ok(Some(_)) => tracing::debug!(key = %key, "cached report is stale, re-measuring"),
                Ok(None) => tracing::debug!(key = %key, "performance cache miss"),
                Err(e) => tracing::warn!(key = %key, error = %e, "performance cache read failed"),
            }
        }

        let report = self.measure_with_retry(target.url(), device, deadline).await.map_err(|cause| {
            tracing::warn!(url = %target.url(), device = %device, cause = %cause, "performance fetch failed");
            FetchError { device, cause }
        })?;

        if !report.stale
            && let Err(e) = self.cache.put(&key, &report, self.ttl).await
        {
            tracing::warn!(key = %key, error = %e, "failed to cache performance report");
        }

        Ok(report)
    }

    /// Fetch mobile and desktop concurrently. One failing never cancels the other.
    pub async fn fetch_all(&self, target: &AuditTarget, policy: CachePolicy, deadline: Instant) -> PerformanceOutcome {
        let (mobile, desktop) = tokio::join!(
            self.fetch(target, Device::Mobile, policy, deadline),
            self.fetch(target, Device::Desktop, policy, deadline),
        );
        PerformanceOutcome::from_results([mobile, desktop])
    }

    async fn measure_with_retry(&self, url: &str, device: Device, deadline: Instant) -> Result<PerformanceReport, FetchCause> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            let call = tokio::time::timeout(self.call_timeout, self.service.measure(url, device));
            let result = match tokio::time::timeout_at(deadline, call).await {
                Err(_) => return Err(FetchCause::DeadlineExceeded),
                Ok(Err(_)) => Err(MeasurementError::Timeout),
                Ok(Ok(result)) => result,
            };

            let err = match result {
                Ok(report) => return Ok(report),
                Err(err) => err,
            };
            let cause = FetchCause::from(&err);

            if !cause.is_transient() {
                tracing::warn!(device = %device, error = %err, "non-retryable measurement error, failing immediately");
                return Err(cause);
            }
            if attempt + 1 >= max_attempts {
                tracing::warn!(device = %device, attempts = attempt + 1, error = %err, "measurement retries exhausted");
                return Err(cause);
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                device = %device,
                attempt = attempt + 1,
                max = max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying measurement after error"
            );

            if tokio::time::timeout_at(deadline, tokio::time::sleep(delay)).await.is_err() {
                return Err(FetchCause::DeadlineExceeded);
            }
            attempt += 1;
        }
    }
}
