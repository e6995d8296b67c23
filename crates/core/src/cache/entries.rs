//! TTL-bound cache entries.
//!
//! Values are stored as JSON and replaced wholesale on every write. Expiry is
//! lazy: an entry past its `expires_at` reads as a miss until it is evicted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::key::CacheKey;
use crate::Error;

/// A decoded cache hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Entry counts for the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total: u64,
    pub expired: u64,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

impl CacheDb {
    /// Read a fresh entry.
    ///
    /// Expired entries and payloads that no longer decode as `T` are misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CacheEntry<T>>, Error> {
        let key_hash = key.hash();
        let now = now_ms();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, i64, i64)>, Error> {
                let result = conn.query_row(
                    "SELECT payload_json, fetched_at, expires_at FROM audit_cache
                     WHERE key_hash = ?1 AND expires_at > ?2",
                    params![key_hash, now],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((payload, fetched_at, expires_at)) = row else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(CacheEntry { value, fetched_at: from_ms(fetched_at), expires_at: from_ms(expires_at) })),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Insert or replace the entry for `key`, expiring after `ttl`.
    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> Result<(), Error> {
        let payload = serde_json::to_string(value)?;
        let key_hash = key.hash();
        let url = key.url.clone();
        let category = key.category.as_str();
        let fetched_at = now_ms();
        let expires_at = fetched_at.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO audit_cache (key_hash, url, category, payload_json, fetched_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(key_hash) DO UPDATE SET
                        url = excluded.url,
                        category = excluded.category,
                        payload_json = excluded.payload_json,
                        fetched_at = excluded.fetched_at,
                        expires_at = excluded.expires_at",
                    params![key_hash, url, category, payload, fetched_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every expired entry. Returns the number of deleted entries.
    pub async fn evict_expired(&self) -> Result<u64, Error> {
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM audit_cache WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every category cached for one normalized site URL.
    pub async fn purge_url(&self, url: &str) -> Result<u64, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM audit_cache WHERE url = ?1", params![url])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn stats(&self) -> Result<CacheStats, Error> {
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<CacheStats, Error> {
                let (total, expired): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(CASE WHEN expires_at <= ?1 THEN 1 ELSE 0 END), 0)
                     FROM audit_cache",
                    params![now],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok(CacheStats { total: total as u64, expired: expired as u64 })
            })
            .await
            .map_err(Error::from)
    }
}
