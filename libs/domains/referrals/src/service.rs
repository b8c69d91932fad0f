use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::cache::{code_key, email_key, owner_key, ReferralCache};
use crate::error::{ReferralError, ReferralResult};
use crate::models::ReferralCode;
use crate::repository::ReferralRepository;

/// Service layer for the referral-code lifecycle
///
/// Coordinates the authoritative repository with the best-effort cache.
/// Precedence is fixed: the repository decides existence and uniqueness; a
/// cached value is only ever a hint that must be re-verified before it is
/// returned. Cache failures (errors or timeouts) are logged and degrade to
/// miss behavior, so the service stays fully correct with the cache down.
///
/// Expiry is intentionally not checked here: an expired code is still a valid
/// record to look up or delete. The registration flow is the sole place that
/// refuses expired codes.
#[derive(Clone)]
pub struct ReferralService<R: ReferralRepository, C: ReferralCache> {
    repository: Arc<R>,
    cache: Arc<C>,
}

impl<R: ReferralRepository, C: ReferralCache> ReferralService<R, C> {
    pub fn new(repository: R, cache: C) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
        }
    }

    /// Create a referral code for an owner.
    ///
    /// The repository serializes the uniqueness check and the insert, so of
    /// two concurrent calls for one owner exactly one succeeds. The cache
    /// entry is written only after a successful insert; a conflicting create
    /// leaves no cache trace.
    pub async fn create_code(
        &self,
        owner_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> ReferralResult<ReferralCode> {
        let referral = self.repository.create(owner_id, code, expires_at).await?;

        self.cache_set(&owner_key(owner_id), &referral.code).await;

        Ok(referral)
    }

    /// Resolve the active code of the user with the given email.
    ///
    /// Cache-first with store re-verification: a cached code string is treated
    /// as a candidate and checked against the repository, which resolves the
    /// cached-but-since-deleted case. Stale divergence surfaces as `NotFound`,
    /// never as a wrong answer.
    pub async fn lookup_by_email(&self, email: &str) -> ReferralResult<ReferralCode> {
        if let Some(cached_code) = self.cache_get(&email_key(email)).await {
            return match self.repository.get_by_code(&cached_code).await? {
                Some(referral) => Ok(referral),
                None => {
                    tracing::debug!(email, "Cached code no longer in store, evicting");
                    self.cache_delete(&email_key(email)).await;
                    Err(ReferralError::NotFound)
                }
            };
        }

        let referral = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(ReferralError::NotFound)?;

        self.cache_set(&email_key(email), &referral.code).await;

        Ok(referral)
    }

    /// Get the code owned by a user (store only)
    pub async fn lookup_by_owner(&self, owner_id: i64) -> ReferralResult<ReferralCode> {
        self.repository
            .get_by_owner(owner_id)
            .await?
            .ok_or(ReferralError::NotFound)
    }

    /// Get a code by its token value (store only, used during redemption)
    pub async fn lookup_by_code(&self, code: &str) -> ReferralResult<ReferralCode> {
        self.repository
            .get_by_code(code)
            .await?
            .ok_or(ReferralError::NotFound)
    }

    /// Delete the code owned by a user.
    ///
    /// The store delete is authoritative; the owner-keyed and code-keyed cache
    /// entries are invalidated best-effort afterwards. Email-keyed entries are
    /// not tracked here and rely on lookup-time re-verification instead.
    pub async fn delete_code(&self, owner_id: i64) -> ReferralResult<ReferralCode> {
        let deleted = self
            .repository
            .delete_by_owner(owner_id)
            .await?
            .ok_or(ReferralError::NotFound)?;

        self.cache_delete(&owner_key(owner_id)).await;
        self.cache_delete(&code_key(&deleted.code)).await;

        Ok(deleted)
    }

    // Cache helpers
    //
    // Every cache failure is absorbed here: reads degrade to a miss, writes
    // and deletes to a no-op, each with a warn log.

    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value).await {
            tracing::warn!(key, error = %e, "Cache write failed, continuing without cache");
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::warn!(key, error = %e, "Cache delete failed, lookups will re-verify");
        }
    }
}
