//! Configuration types for axum-helpers.
//!
//! This module provides configuration structs that implement the `FromEnv` trait
//! from `core_config`, following the same pattern as `PostgresConfig` and `RedisConfig`.

use core_config::{env_or_default, env_required, ConfigError, FromEnv};
use jsonwebtoken::Algorithm;

/// Default access-token lifetime in seconds (15 minutes)
const DEFAULT_TTL_SECONDS: i64 = 900;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - must be at least 32 characters for security
/// - `JWT_ALGORITHM` (optional, default: HS256) - HS256, HS384 or HS512
/// - `JWT_TTL_SECONDS` (optional, default: 900) - access-token lifetime
///
/// # Example
///
/// ```ignore
/// use axum_helpers::JwtConfig;
/// use core_config::FromEnv;
///
/// // From environment variables
/// let config = JwtConfig::from_env()?;
///
/// // Manual construction (for testing)
/// let config = JwtConfig::new("my-super-secret-key-that-is-at-least-32-chars");
/// ```
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    /// Signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Access-token lifetime in seconds
    pub ttl_seconds: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret and defaults (HS256, 15 min).
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            algorithm: Algorithm::HS256,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// Override the token lifetime.
    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    // Only HMAC algorithms make sense with a shared-secret key
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::ParseError {
            key: "JWT_ALGORITHM".to_string(),
            details: format!("unsupported algorithm '{}', expected HS256/HS384/HS512", other),
        }),
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let algorithm = parse_algorithm(&env_or_default("JWT_ALGORITHM", "HS256"))?;

        let ttl_seconds = env_or_default("JWT_TTL_SECONDS", "900")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "JWT_TTL_SECONDS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            secret,
            algorithm,
            ttl_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_new_valid() {
        let secret = "this-is-a-valid-secret-with-32-chars!";
        let config = JwtConfig::new(secret);
        assert_eq!(config.secret, secret);
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.ttl_seconds, 900);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("JWT_ALGORITHM", None::<&str>),
                ("JWT_TTL_SECONDS", None::<&str>),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, "this-is-a-valid-secret-with-32-chars!");
                assert_eq!(config.algorithm, Algorithm::HS256);
                assert_eq!(config.ttl_seconds, 900);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("32 characters"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_custom_algorithm_and_ttl() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("JWT_ALGORITHM", Some("HS512")),
                ("JWT_TTL_SECONDS", Some("3600")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.algorithm, Algorithm::HS512);
                assert_eq!(config.ttl_seconds, 3600);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_unsupported_algorithm() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("JWT_ALGORITHM", Some("RS256")),
            ],
            || {
                let config = JwtConfig::from_env();
                assert!(config.is_err());
                assert!(config.unwrap_err().to_string().contains("JWT_ALGORITHM"));
            },
        );
    }
}
