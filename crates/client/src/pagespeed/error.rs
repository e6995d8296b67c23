//! PageSpeed Insights client error types.

use sitebrief_core::FetchCause;

use crate::fetch::root_cause;

/// Errors from the PageSpeed Insights API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeasurementError {
    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Per-key or per-IP quota exhausted.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Authentication failed (invalid or restricted API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// The service refused the request itself (unreachable URL, bad parameters).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Network error, reduced to its root cause with the request URL removed.
    #[error("network error: {0}")]
    Network(String),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for MeasurementError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { MeasurementError::Timeout } else { MeasurementError::Network(root_cause(err)) }
    }
}

impl From<&MeasurementError> for FetchCause {
    fn from(err: &MeasurementError) -> Self {
        match err {
            MeasurementError::Timeout => FetchCause::Timeout,
            MeasurementError::RateLimited => FetchCause::RateLimited,
            MeasurementError::AuthError => FetchCause::Rejected("authentication failed".to_string()),
            MeasurementError::InvalidRequest(msg) => FetchCause::Rejected(msg.clone()),
            MeasurementError::HttpError { status } if *status >= 500 => FetchCause::ServerError(*status),
            MeasurementError::HttpError { status } => FetchCause::Rejected(format!("HTTP {status}")),
            MeasurementError::Network(msg) => FetchCause::Network(msg.clone()),
            MeasurementError::Parse(msg) => FetchCause::Malformed(msg.clone()),
        }
    }
}
