use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user.
    ///
    /// The insert and the email-uniqueness check are a single atomic unit;
    /// when `referrer_id` is set it is written in the same operation, so a
    /// user row can never exist without its referrer link.
    async fn create(&self, user: NewUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Check if an email already exists
    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    /// List all users referred by the given owner
    async fn list_by_referrer(&self, referrer_id: i64) -> UserResult<Vec<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        // Case-sensitive exact match, same policy as the unique index
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: chrono::Utc::now(),
            referrer_id: user.referrer_id,
        };

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users.values().find(|u| u.email == email).cloned();
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }

    async fn list_by_referrer(&self, referrer_id: i64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| u.referrer_id == Some(referrer_id))
            .cloned()
            .collect();

        // Oldest first, matching the SQL ordering
        result.sort_by_key(|u| u.id);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, referrer_id: Option<i64>) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "hashed_password".to_string(),
            referrer_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(new_user("test@example.com", None)).await.unwrap();
        assert_eq!(created.email, "test@example.com");
        assert_eq!(created.referrer_id, None);

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_get_by_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("test@example.com", None)).await.unwrap();

        let fetched = repo.get_by_email("test@example.com").await.unwrap();
        assert!(fetched.is_some());

        let fetched = repo.get_by_email("TEST@EXAMPLE.COM").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("test@example.com", None)).await.unwrap();

        let result = repo.create(new_user("test@example.com", None)).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_referrer_link_is_set_at_creation() {
        let repo = InMemoryUserRepository::new();

        let owner = repo.create(new_user("owner@example.com", None)).await.unwrap();
        let referred = repo
            .create(new_user("referred@example.com", Some(owner.id)))
            .await
            .unwrap();

        assert_eq!(referred.referrer_id, Some(owner.id));
    }

    #[tokio::test]
    async fn test_list_by_referrer() {
        let repo = InMemoryUserRepository::new();

        let owner = repo.create(new_user("owner@example.com", None)).await.unwrap();
        repo.create(new_user("a@example.com", Some(owner.id))).await.unwrap();
        repo.create(new_user("b@example.com", Some(owner.id))).await.unwrap();
        repo.create(new_user("c@example.com", None)).await.unwrap();

        let referred = repo.list_by_referrer(owner.id).await.unwrap();
        assert_eq!(referred.len(), 2);
        assert_eq!(referred[0].email, "a@example.com");
        assert_eq!(referred[1].email, "b@example.com");

        let none = repo.list_by_referrer(999).await.unwrap();
        assert!(none.is_empty());
    }
}
