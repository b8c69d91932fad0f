use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

use domain_referrals::cache::ReferralCache;
use domain_referrals::repository::ReferralRepository;
use domain_referrals::{ReferralError, ReferralService};

use crate::error::{UserError, UserResult};
use crate::models::{
    NewUser, RegisterRequest, ReferredRegistrationResponse, ReferredUserResponse, User,
    UserResponse,
};
use crate::repository::UserRepository;

/// Service layer for registration, login, and referral redemption
#[derive(Clone)]
pub struct UserService<U: UserRepository> {
    repository: Arc<U>,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repository: U) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user with no referrer.
    ///
    /// Fails with [`UserError::DuplicateEmail`] when the email is taken;
    /// the repository adjudicates that atomically with the insert.
    pub async fn register(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        let hashed_password = self.hash_password(&input.password)?;

        let user = self
            .repository
            .create(NewUser {
                email: input.email,
                hashed_password,
                referrer_id: None,
            })
            .await?;

        Ok(user.into())
    }

    /// Register a new user through a referral code.
    ///
    /// Order of checks:
    /// 1. the code must exist (store lookup, cache never consulted here);
    /// 2. the code must not be past its expiry - the only expiry check in
    ///    the whole system, applied strictly (`expires_at < now`);
    /// 3. the email must be free, adjudicated by the same INSERT that writes
    ///    the referrer link, so no user row can outlive a failed linking.
    pub async fn register_with_referral<R, C>(
        &self,
        input: RegisterRequest,
        code: &str,
        referrals: &ReferralService<R, C>,
    ) -> UserResult<ReferredRegistrationResponse>
    where
        R: ReferralRepository,
        C: ReferralCache,
    {
        let referral = referrals.lookup_by_code(code).await.map_err(|e| match e {
            ReferralError::NotFound => UserError::ReferralNotFound(code.to_string()),
            other => UserError::Internal(other.to_string()),
        })?;

        if referral.is_expired_at(Utc::now()) {
            return Err(UserError::ReferralExpired(referral.code));
        }

        let hashed_password = self.hash_password(&input.password)?;

        let user = self
            .repository
            .create(NewUser {
                email: input.email,
                hashed_password,
                referrer_id: Some(referral.owner_id),
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            referrer_id = %referral.owner_id,
            code = %referral.code,
            "Registered user via referral code"
        );

        Ok(ReferredRegistrationResponse {
            user_id: user.id,
            email: user.email,
            referral_code: referral.code,
            referral_user_id: referral.owner_id,
        })
    }

    /// Verify user credentials (for login).
    ///
    /// Unknown email and wrong password both yield the same
    /// [`UserError::InvalidCredentials`] so callers cannot probe which
    /// emails are registered.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.hashed_password)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by email (for the authenticated /me endpoint)
    pub async fn get_by_email(&self, email: &str) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::Unauthorized)?;

        Ok(user.into())
    }

    /// List the users referred by the given owner
    pub async fn list_referred(&self, owner_id: i64) -> UserResult<Vec<ReferredUserResponse>> {
        let users = self.repository.list_by_referrer(owner_id).await?;
        Ok(users.into_iter().map(|u| u.into()).collect())
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use chrono::{DateTime, TimeZone};
    use domain_referrals::{InMemoryReferralCache, InMemoryReferralRepository};

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn long_past() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "correct horse battery".to_string(),
        }
    }

    fn users() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new())
    }

    fn referrals() -> ReferralService<InMemoryReferralRepository, InMemoryReferralCache> {
        ReferralService::new(
            InMemoryReferralRepository::new(),
            InMemoryReferralCache::new(),
        )
    }

    #[tokio::test]
    async fn test_register_returns_id_and_email() {
        let service = users();

        let created = service
            .register(register_request("new@example.com"))
            .await
            .unwrap();

        assert_eq!(created.email, "new@example.com");
        assert!(created.user_id >= 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = users();

        service.register(register_request("dup@example.com")).await.unwrap();
        let result = service.register(register_request("dup@example.com")).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let service = users();

        let created = service
            .register(register_request("login@example.com"))
            .await
            .unwrap();

        let user = service
            .verify_credentials("login@example.com", "correct horse battery")
            .await
            .unwrap();

        assert_eq!(user.id, created.user_id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let service = users();

        service.register(register_request("known@example.com")).await.unwrap();

        let wrong_password = service
            .verify_credentials("known@example.com", "not the password")
            .await;
        let unknown_email = service
            .verify_credentials("unknown@example.com", "correct horse battery")
            .await;

        assert!(matches!(wrong_password, Err(UserError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_with_referral_links_referrer() {
        let users = users();
        let referrals = referrals();

        let owner = users.register(register_request("owner@example.com")).await.unwrap();
        referrals
            .create_code(owner.user_id, "ABC123", far_future())
            .await
            .unwrap();

        let referred = users
            .register_with_referral(register_request("friend@example.com"), "ABC123", &referrals)
            .await
            .unwrap();

        assert_eq!(referred.referral_code, "ABC123");
        assert_eq!(referred.referral_user_id, owner.user_id);

        let listed = users.list_referred(owner.user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "friend@example.com");
    }

    #[tokio::test]
    async fn test_register_with_unknown_code_not_found_and_no_user_created() {
        let users = users();
        let referrals = referrals();

        let result = users
            .register_with_referral(register_request("friend@example.com"), "NOPE", &referrals)
            .await;

        assert!(matches!(result, Err(UserError::ReferralNotFound(_))));
        assert!(matches!(
            users.verify_credentials("friend@example.com", "correct horse battery").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_with_expired_code_rejected_and_no_user_created() {
        let users = users();
        let referrals = referrals();

        let owner = users.register(register_request("owner@example.com")).await.unwrap();
        referrals
            .create_code(owner.user_id, "OLD-CODE", long_past())
            .await
            .unwrap();

        let result = users
            .register_with_referral(register_request("friend@example.com"), "OLD-CODE", &referrals)
            .await;

        assert!(matches!(result, Err(UserError::ReferralExpired(_))));

        // No partial side effect: the user row must not exist
        let listed = users.list_referred(owner.user_id).await.unwrap();
        assert!(listed.is_empty());
        assert!(matches!(
            users.get_by_email("friend@example.com").await,
            Err(UserError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_register_with_referral_duplicate_email_conflicts() {
        let users = users();
        let referrals = referrals();

        let owner = users.register(register_request("owner@example.com")).await.unwrap();
        referrals
            .create_code(owner.user_id, "ABC123", far_future())
            .await
            .unwrap();

        let result = users
            .register_with_referral(register_request("owner@example.com"), "ABC123", &referrals)
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_one_code_serves_many_registrants() {
        let users = users();
        let referrals = referrals();

        let owner = users.register(register_request("owner@example.com")).await.unwrap();
        referrals
            .create_code(owner.user_id, "SHARED", far_future())
            .await
            .unwrap();

        // No consumed state: the same code links any number of registrants
        for i in 0..3 {
            users
                .register_with_referral(
                    register_request(&format!("friend{}@example.com", i)),
                    "SHARED",
                    &referrals,
                )
                .await
                .unwrap();
        }

        let listed = users.list_referred(owner.user_id).await.unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_referrer_link_survives_code_deletion() {
        let users = users();

        let referral_repo = InMemoryReferralRepository::new();
        referral_repo.register_owner("owner@example.com", 1).await;
        let referrals = ReferralService::new(referral_repo, InMemoryReferralCache::new());

        let owner = users.register(register_request("owner@example.com")).await.unwrap();
        assert_eq!(owner.user_id, 1);

        referrals
            .create_code(owner.user_id, "ABC123", far_future())
            .await
            .unwrap();

        let referred = users
            .register_with_referral(register_request("friend@example.com"), "ABC123", &referrals)
            .await
            .unwrap();
        assert_eq!(referred.referral_user_id, 1);

        // Warm the email-keyed cache entry, then delete the code
        referrals.lookup_by_email("owner@example.com").await.unwrap();
        referrals.delete_code(owner.user_id).await.unwrap();

        // The code is gone, even through the stale cache path
        assert!(matches!(
            referrals.lookup_by_email("owner@example.com").await,
            Err(ReferralError::NotFound)
        ));

        // But the referrer link on the registered user is untouched
        let listed = users.list_referred(owner.user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "friend@example.com");
    }
}
