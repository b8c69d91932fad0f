//! Best-effort cache for referral-code lookups.
//!
//! Entries are disposable copies keyed by lookup dimension (owner id, owner
//! email, code string). No correctness property may depend on an entry being
//! present or accurate: the service layer re-verifies every cached value
//! against the store and treats any cache failure as a miss.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Default per-operation timeout for cache calls
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache key for the owner-id lookup dimension
pub fn owner_key(owner_id: i64) -> String {
    format!("referral:owner:{}", owner_id)
}

/// Cache key for the email lookup dimension
pub fn email_key(email: &str) -> String {
    format!("referral:email:{}", email)
}

/// Cache key for the code lookup dimension
pub fn code_key(code: &str) -> String {
    format!("referral:code:{}", code)
}

/// Cache trait for referral-code acceleration
#[async_trait]
pub trait ReferralCache: Send + Sync {
    /// Read a cached code string, `None` on miss
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Write a code string under the given key
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Remove a cached entry; removing a missing key is not an error
    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// Redis-backed implementation of ReferralCache
///
/// Every operation is bounded by a timeout so a wedged Redis cannot stall
/// request handling; callers treat timeouts like any other cache failure.
#[derive(Clone)]
pub struct RedisReferralCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisReferralCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> CacheResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl ReferralCache for RedisReferralCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        self.bounded(async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_string();
        self.bounded(async move { conn.set::<_, _, ()>(key, value).await })
            .await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        self.bounded(async move { conn.del::<_, ()>(key).await })
            .await
    }
}

/// In-memory implementation of ReferralCache (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryReferralCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryReferralCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry directly, bypassing the service layer.
    ///
    /// Test hook for staging stale-cache scenarios.
    pub async fn seed(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    /// Read an entry directly (test hook).
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ReferralCache for InMemoryReferralCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_cache_round_trip() {
        let cache = InMemoryReferralCache::new();

        assert_eq!(cache.get("referral:owner:1").await.unwrap(), None);

        cache.set("referral:owner:1", "ABC123").await.unwrap();
        assert_eq!(
            cache.get("referral:owner:1").await.unwrap(),
            Some("ABC123".to_string())
        );

        cache.delete("referral:owner:1").await.unwrap();
        assert_eq!(cache.get("referral:owner:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let cache = InMemoryReferralCache::new();
        assert!(cache.delete("referral:owner:42").await.is_ok());
    }

    #[test]
    fn test_key_shapes() {
        assert_eq!(owner_key(7), "referral:owner:7");
        assert_eq!(email_key("a@b.c"), "referral:email:a@b.c");
        assert_eq!(code_key("XYZ"), "referral:code:XYZ");
    }
}
