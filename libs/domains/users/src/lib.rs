//! Users Domain
//!
//! Registration, login, and referral redemption.
//!
//! # Features
//!
//! - Email/password registration with Argon2 hashing
//! - Registration through a referral code (links the new user to the code
//!   owner at creation time; the link is immutable afterwards)
//! - Login issuing a signed, time-limited bearer token
//! - Lookup of the users referred by an owner
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, token issuance
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← registration rules, expiry enforcement, password hashing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entities, DTOs
//! └─────────────┘
//! ```
//!
//! Referral-code resolution goes through `domain_referrals`; this crate only
//! decides *whether* a resolved code may still be redeemed (the expiry check
//! lives here and nowhere else).

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres_repository_impl;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use models::{
    LoginRequest, NewUser, RegisterRequest, ReferredRegistrationResponse, ReferredUserResponse,
    TokenResponse, User, UserResponse,
};
pub use postgres_repository_impl::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
