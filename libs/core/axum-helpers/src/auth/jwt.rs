use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // Subject (user email)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub jti: String, // JWT ID
}

/// Stateless JWT issuer/verifier.
///
/// Tokens are signed with the configured HMAC secret and expire after the
/// configured TTL. The subject claim carries the user's email.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    algorithm: jsonwebtoken::Algorithm,
    ttl_seconds: i64,
}

impl JwtAuth {
    /// Create a new JWT auth instance.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt_auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!("JWT auth initialized (alg: {:?})", config.algorithm);
        Self {
            secret: config.secret.clone(),
            algorithm: config.algorithm,
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Create an access token for the given subject (user email).
    pub fn create_access_token(&self, email: &str) -> eyre::Result<String> {
        self.create_token(email, self.ttl_seconds)
    }

    /// Token lifetime in seconds, as configured.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Create a JWT token with the specified TTL
    fn create_token(&self, email: &str, ttl_seconds: i64) -> eyre::Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(ttl_seconds)).timestamp();
        let iat = now.timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = JwtClaims {
            sub: email.to_string(),
            exp,
            iat,
            jti,
        };

        let header = Header {
            alg: self.algorithm,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims
    ///
    /// Expiry (`exp`) is validated by `jsonwebtoken` itself.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(self.algorithm),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("unit-test-secret-that-is-long-enough!!"))
    }

    #[test]
    fn test_token_round_trip() {
        let auth = test_auth();

        let token = auth.create_access_token("user@example.com").unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "user@example.com");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = test_auth();

        let mut token = auth.create_access_token("user@example.com").unwrap();
        // Flip a character in the payload segment
        let mid = token.len() / 2;
        let replacement = if token.as_bytes()[mid] == b'a' { "b" } else { "a" };
        token.replace_range(mid..mid + 1, replacement);

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = test_auth();
        let other = JwtAuth::new(&JwtConfig::new("a-completely-different-secret-value!!!"));

        let token = auth.create_access_token("user@example.com").unwrap();
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = JwtAuth::new(
            &JwtConfig::new("unit-test-secret-that-is-long-enough!!").with_ttl_seconds(-120),
        );

        let token = auth.create_access_token("user@example.com").unwrap();
        assert!(auth.verify_token(&token).is_err());
    }
}
