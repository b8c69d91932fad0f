use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::ValidatedJson;
use serde::Deserialize;
use std::sync::Arc;

use crate::cache::ReferralCache;
use crate::error::ReferralResult;
use crate::models::{CreateReferral, ReferralResponse};
use crate::repository::ReferralRepository;
use crate::service::ReferralService;

/// Create the referrals router with all HTTP endpoints
pub fn router<R, C>(service: ReferralService<R, C>) -> Router
where
    R: ReferralRepository + 'static,
    C: ReferralCache + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/referral/create/", post(create_referral))
        .route("/referral/{email}", get(get_referral_by_email))
        .route("/referral/", axum::routing::delete(delete_referral))
        .with_state(shared_service)
}

/// Query parameter identifying the code owner
#[derive(Debug, Deserialize)]
struct OwnerQuery {
    user_id: i64,
}

/// Create a new referral code for a user
///
/// POST /referral/create/?user_id=<id>
async fn create_referral<R: ReferralRepository, C: ReferralCache>(
    State(service): State<Arc<ReferralService<R, C>>>,
    Query(owner): Query<OwnerQuery>,
    ValidatedJson(input): ValidatedJson<CreateReferral>,
) -> ReferralResult<impl IntoResponse> {
    let referral = service
        .create_code(owner.user_id, &input.code, input.expires_at)
        .await?;

    Ok((StatusCode::CREATED, Json(ReferralResponse::from(referral))))
}

/// Get the referral code owned by the user with the given email
///
/// GET /referral/{email}
async fn get_referral_by_email<R: ReferralRepository, C: ReferralCache>(
    State(service): State<Arc<ReferralService<R, C>>>,
    Path(email): Path<String>,
) -> ReferralResult<Json<ReferralResponse>> {
    let referral = service.lookup_by_email(&email).await?;
    Ok(Json(referral.into()))
}

/// Delete the referral code owned by a user
///
/// DELETE /referral/?user_id=<id>
async fn delete_referral<R: ReferralRepository, C: ReferralCache>(
    State(service): State<Arc<ReferralService<R, C>>>,
    Query(owner): Query<OwnerQuery>,
) -> ReferralResult<Json<ReferralResponse>> {
    let deleted = service.delete_code(owner.user_id).await?;
    Ok(Json(deleted.into()))
}
