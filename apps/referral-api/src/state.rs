//! Application state management.
//!
//! This module defines the shared application state passed to all request handlers.
//! Connections are explicit, injected dependencies: they are opened once in
//! `main`, carried here, and closed in the shutdown cleanup. No ambient
//! singletons.

use axum_helpers::JwtAuth;

/// Shared application state.
///
/// This struct is cloned for each handler (inexpensive Arc clones), providing access to:
/// - Application configuration
/// - PostgreSQL database connection pool (authoritative store)
/// - Redis connection manager (best-effort cache)
/// - JWT issuer/verifier
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Redis connection manager
    pub redis: database::redis::ConnectionManager,
    /// Stateless JWT authentication
    pub jwt_auth: JwtAuth,
}
