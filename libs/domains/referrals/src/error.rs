use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("User {0} already has an active referral code")]
    CodeExists(i64),

    #[error("Referral code '{0}' is already taken")]
    DuplicateCode(String),

    #[error("Referral code not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ReferralResult<T> = Result<T, ReferralError>;

impl IntoResponse for ReferralError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ReferralError::CodeExists(owner_id) => (
                StatusCode::CONFLICT,
                "conflict",
                format!("User {} already has an active referral code", owner_id),
            ),
            ReferralError::DuplicateCode(code) => (
                StatusCode::CONFLICT,
                "conflict",
                format!("Referral code '{}' is already taken", code),
            ),
            ReferralError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Referral code not found".to_string(),
            ),
            ReferralError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}
