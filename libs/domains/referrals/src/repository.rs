use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ReferralError, ReferralResult};
use crate::models::ReferralCode;

/// Repository trait for ReferralCode persistence
///
/// The repository is the authority for the one-code-per-owner invariant:
/// `create` must atomically check and insert so that two concurrent creates
/// for the same owner can never both succeed.
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Create a referral code for an owner.
    ///
    /// Fails with [`ReferralError::CodeExists`] when the owner already has a
    /// code and [`ReferralError::DuplicateCode`] when the code string is taken.
    async fn create(
        &self,
        owner_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> ReferralResult<ReferralCode>;

    /// Get the code owned by a user
    async fn get_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>>;

    /// Get the code owned by the user with the given email
    async fn get_by_email(&self, email: &str) -> ReferralResult<Option<ReferralCode>>;

    /// Get a code by its token value
    async fn get_by_code(&self, code: &str) -> ReferralResult<Option<ReferralCode>>;

    /// Delete the code owned by a user, returning the deleted record
    async fn delete_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>>;
}

/// In-memory implementation of ReferralRepository (for development/testing)
///
/// All mutations take the single write lock, which serializes concurrent
/// creates the way the UNIQUE constraint does in PostgreSQL.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReferralRepository {
    codes: Arc<RwLock<HashMap<i64, ReferralCode>>>,
    // Stand-in for the users table side of the email join
    owner_emails: Arc<RwLock<HashMap<String, i64>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryReferralRepository {
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            owner_emails: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Record an owner's email so `get_by_email` can resolve it.
    ///
    /// The PostgreSQL implementation joins against the users table; this
    /// stand-in must be told about owners explicitly.
    pub async fn register_owner(&self, email: &str, owner_id: i64) {
        self.owner_emails
            .write()
            .await
            .insert(email.to_string(), owner_id);
    }
}

#[async_trait]
impl ReferralRepository for InMemoryReferralRepository {
    async fn create(
        &self,
        owner_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> ReferralResult<ReferralCode> {
        let mut codes = self.codes.write().await;

        if codes.contains_key(&owner_id) {
            return Err(ReferralError::CodeExists(owner_id));
        }

        if codes.values().any(|c| c.code == code) {
            return Err(ReferralError::DuplicateCode(code.to_string()));
        }

        let referral = ReferralCode {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            code: code.to_string(),
            owner_id,
            expires_at,
        };

        codes.insert(owner_id, referral.clone());

        tracing::info!(owner_id, code, "Created referral code");
        Ok(referral)
    }

    async fn get_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>> {
        let codes = self.codes.read().await;
        Ok(codes.get(&owner_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> ReferralResult<Option<ReferralCode>> {
        let owner_id = match self.owner_emails.read().await.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.get_by_owner(owner_id).await
    }

    async fn get_by_code(&self, code: &str) -> ReferralResult<Option<ReferralCode>> {
        let codes = self.codes.read().await;
        Ok(codes.values().find(|c| c.code == code).cloned())
    }

    async fn delete_by_owner(&self, owner_id: i64) -> ReferralResult<Option<ReferralCode>> {
        let mut codes = self.codes.write().await;
        let deleted = codes.remove(&owner_id);

        if deleted.is_some() {
            tracing::info!(owner_id, "Deleted referral code");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_by_owner() {
        let repo = InMemoryReferralRepository::new();

        let created = repo.create(1, "ABC123", far_future()).await.unwrap();
        assert_eq!(created.owner_id, 1);
        assert_eq!(created.code, "ABC123");

        let fetched = repo.get_by_owner(1).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_create_second_code_for_owner_conflicts() {
        let repo = InMemoryReferralRepository::new();

        repo.create(1, "FIRST", far_future()).await.unwrap();
        let result = repo.create(1, "SECOND", far_future()).await;

        assert!(matches!(result, Err(ReferralError::CodeExists(1))));
        // The original code is untouched
        assert_eq!(repo.get_by_owner(1).await.unwrap().unwrap().code, "FIRST");
    }

    #[tokio::test]
    async fn test_create_duplicate_code_string_conflicts() {
        let repo = InMemoryReferralRepository::new();

        repo.create(1, "SHARED", far_future()).await.unwrap();
        let result = repo.create(2, "SHARED", far_future()).await;

        assert!(matches!(result, Err(ReferralError::DuplicateCode(_))));
    }

    #[tokio::test]
    async fn test_get_by_email_through_owner_directory() {
        let repo = InMemoryReferralRepository::new();

        repo.register_owner("owner@example.com", 1).await;
        repo.create(1, "ABC123", far_future()).await.unwrap();

        let fetched = repo.get_by_email("owner@example.com").await.unwrap();
        assert_eq!(fetched.unwrap().code, "ABC123");

        let missing = repo.get_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_owner_returns_deleted_record() {
        let repo = InMemoryReferralRepository::new();

        repo.create(1, "ABC123", far_future()).await.unwrap();

        let deleted = repo.delete_by_owner(1).await.unwrap();
        assert_eq!(deleted.unwrap().code, "ABC123");

        assert!(repo.get_by_owner(1).await.unwrap().is_none());
        assert!(repo.delete_by_owner(1).await.unwrap().is_none());
    }
}
