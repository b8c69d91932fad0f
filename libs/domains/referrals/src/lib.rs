//! Referrals Domain
//!
//! Manages the referral-code lifecycle: creation (one active code per owner),
//! lookup, and deletion, coordinating the authoritative PostgreSQL store with
//! a best-effort Redis cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← lifecycle rules, cache/store precedence
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼───┐ ┌─▼────┐
//! │ Repo │ │Cache │  ← store is authoritative, cache is a hint
//! └──────┘ └──────┘
//! ```
//!
//! The consistency model is deliberately asymmetric: every uniqueness and
//! existence decision is made by the repository; cache entries are disposable
//! copies that may vanish or go stale at any time. A cached value is never
//! returned without re-verification against the store, and a cache failure
//! only ever degrades to store-backed behavior.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres_repository_impl;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use cache::{CacheError, InMemoryReferralCache, RedisReferralCache, ReferralCache};
pub use error::{ReferralError, ReferralResult};
pub use models::{CreateReferral, ReferralCode, ReferralResponse};
pub use postgres_repository_impl::PostgresReferralRepository;
pub use repository::{InMemoryReferralRepository, ReferralRepository};
pub use service::ReferralService;
