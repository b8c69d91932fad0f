//! Stateless JWT authentication.
//!
//! Tokens are signed with an HMAC secret and carry the authenticated user's
//! email as the `sub` claim. There is no server-side token state: possession
//! of a token with a valid signature and unexpired `exp` claim is the whole
//! authentication story.

mod config;
mod jwt;
mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
