use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User entity - matches SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// User email (unique, compared case-sensitively)
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// The user whose referral code was redeemed at registration.
    /// Set at most once, at creation; there is no update path.
    pub referrer_id: Option<i64>,
}

/// Insert payload for a new user (password already hashed by the service)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub referrer_id: Option<i64>,
}

/// DTO for registration and login bodies
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

/// User response DTO (without hashed_password)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: i64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
        }
    }
}

/// Response after a registration that redeemed a referral code
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferredRegistrationResponse {
    pub user_id: i64,
    pub email: String,
    /// The redeemed code, echoed back
    pub referral_code: String,
    /// The code owner the new user is now linked to
    pub referral_user_id: i64,
}

/// Response after successful login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
}

/// A user referred by some owner (for the referred-users listing)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferredUserResponse {
    pub user_id: i64,
    pub email: String,
}

impl From<User> for ReferredUserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
        }
    }
}
