//! Unified error types for sitebrief.
//!
//! Run-level failures (`AuditFailed`, `Template`) and infrastructure faults share
//! one enum; per-input failures are recorded as [`FetchError`] and
//! [`ScrapeAborted`] and never escape the pipeline on their own.

use std::fmt;

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::model::Device;

/// Unified error types for the sitebrief pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown cache category).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cached payload could not be encoded.
    #[error("CACHE_ERROR: invalid payload: {0}")]
    InvalidPayload(String),

    /// HTTP client could not be built or used.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Neither a performance report nor a scraped page was available.
    #[error("AUDIT_FAILED: {0}")]
    AuditFailed(String),

    /// Template authoring defect.
    #[error("TEMPLATE_ERROR: {0}")]
    Template(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidPayload(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::InvalidPayload(msg) => (-32002, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::AuditFailed(msg) => (-32020, msg.clone()),
            Error::Template(msg) => (-32021, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

/// Why a single external call produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    Timeout,
    RateLimited,
    ServerError(u16),
    Rejected(String),
    Malformed(String),
    Network(String),
    DeadlineExceeded,
}

impl FetchCause {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited | Self::ServerError(_) | Self::Network(_))
    }
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::ServerError(status) => write!(f, "server error ({status})"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Malformed(reason) => write!(f, "malformed response: {reason}"),
            Self::Network(reason) => write!(f, "network error: {reason}"),
            Self::DeadlineExceeded => write!(f, "audit deadline exceeded"),
        }
    }
}

/// A performance measurement that produced no report for one device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{device} performance fetch failed: {cause}")]
pub struct FetchError {
    pub device: Device,
    pub cause: FetchCause,
}

/// The target host was unreachable for the first scraped role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scrape of {host} aborted: {cause}")]
pub struct ScrapeAborted {
    pub host: String,
    pub cause: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::AuditFailed("no inputs".to_string());
        assert!(err.to_string().contains("AUDIT_FAILED"));
        assert!(err.to_string().contains("no inputs"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::Template("unknown placeholder".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32021);
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError { device: Device::Desktop, cause: FetchCause::Timeout };
        assert_eq!(err.to_string(), "desktop performance fetch failed: timed out");
    }

    #[test]
    fn test_transient_causes() {
        assert!(FetchCause::Timeout.is_transient());
        assert!(FetchCause::ServerError(503).is_transient());
        assert!(FetchCause::RateLimited.is_transient());
        assert!(!FetchCause::Rejected("bad key".into()).is_transient());
        assert!(!FetchCause::Malformed("eof".into()).is_transient());
        assert!(!FetchCause::DeadlineExceeded.is_transient());
    }
}
