//! cache_get tool implementation.
//!
//! Reads one fresh cache entry by site URL and category.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitebrief_core::cache::CacheEntry;
use sitebrief_core::model::normalize;
use sitebrief_core::{CacheCategory, CacheDb, CacheKey, Error};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The audited site URL; normalized the same way audits are.
    pub url: String,

    /// "mobile", "desktop", "home", "about", "contact" or "services".
    pub category: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetOutput {
    pub url: String,
    pub category: CacheCategory,
    /// The cached entry, absent on a miss or when the entry has expired.
    pub entry: Option<CacheEntry<Value>>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = normalize(&params.url).map_err(Error::from)?;
    let category = params.category.parse::<CacheCategory>()?;

    let entry = cache.get::<Value>(&CacheKey::new(url.clone(), category)).await?;
    tracing::debug!(url = %url, category = %category, hit = entry.is_some(), "cache_get");

    let output = CacheGetOutput { url, category, entry };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize cache entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn output_of(result: &CallToolResult) -> CacheGetOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { url: "example.com".to_string(), category: "mobile".to_string() };

        let result = get_impl(&cache, params).await.unwrap();
        let output = output_of(&result);
        assert_eq!(output.url, "https://example.com");
        assert!(output.entry.is_none());
    }

    #[tokio::test]
    async fn test_get_impl_found_with_normalized_url() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let key = CacheKey::new("https://example.com", CacheCategory::Home);
        cache.put(&key, &serde_json::json!({"title": "Acme"}), Duration::from_secs(60)).await.unwrap();

        let params = CacheGetParams { url: "HTTPS://Example.com/".to_string(), category: "Home".to_string() };
        let result = get_impl(&cache, params).await.unwrap();

        let entry = output_of(&result).entry.unwrap();
        assert_eq!(entry.value["title"], "Acme");
        assert!(entry.expires_at > entry.fetched_at);
    }

    #[tokio::test]
    async fn test_get_impl_unknown_category() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { url: "example.com".to_string(), category: "blog".to_string() };

        let err = get_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_get_impl_invalid_url() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { url: "ftp://example.com".to_string(), category: "home".to_string() };

        assert!(get_impl(&cache, params).await.is_err());
    }
}
