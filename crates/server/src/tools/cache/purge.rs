//! cache_purge tool implementation.
//!
//! Evicts expired entries, everything cached for one site, or both.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitebrief_core::cache::CacheStats;
use sitebrief_core::model::normalize;
use sitebrief_core::{CacheDb, Error};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete every expired entry.
    #[serde(default)]
    pub expired: bool,

    /// Delete every category cached for this site URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
    /// Store counts after the purge.
    pub remaining: CacheStats,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if !params.expired && params.url.is_none() {
        return Err(Error::InvalidInput("At least one of expired or url must be specified".to_string()).into());
    }

    let mut deleted_total = 0u64;

    if params.expired {
        deleted_total += cache.evict_expired().await?;
    }

    if let Some(url) = params.url {
        let url = normalize(&url).map_err(Error::from)?;
        deleted_total += cache.purge_url(&url).await?;
    }

    let remaining = cache.stats().await?;
    tracing::info!(deleted = deleted_total, remaining = remaining.total, "cache purged");

    let output = CachePurgeOutput { deleted: deleted_total, remaining };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
