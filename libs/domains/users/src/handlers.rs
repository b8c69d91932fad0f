use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_helpers::{jwt_auth_middleware, JwtAuth, JwtClaims, ValidatedJson};
use serde::Deserialize;
use std::sync::Arc;

use domain_referrals::cache::ReferralCache;
use domain_referrals::repository::ReferralRepository;
use domain_referrals::ReferralService;

use crate::error::UserError;
use crate::models::{
    LoginRequest, RegisterRequest, ReferredUserResponse, TokenResponse, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Application state for the user-facing handlers
pub struct AuthState<U, R, C>
where
    U: UserRepository,
    R: ReferralRepository,
    C: ReferralCache,
{
    pub users: UserService<U>,
    pub referrals: ReferralService<R, C>,
    pub jwt_auth: JwtAuth,
}

/// Create the users router with all HTTP endpoints
pub fn router<U, R, C>(state: AuthState<U, R, C>) -> Router
where
    U: UserRepository + 'static,
    R: ReferralRepository + 'static,
    C: ReferralCache + 'static,
{
    let jwt_auth = state.jwt_auth.clone();
    let shared_state = Arc::new(state);

    let protected = Router::new()
        .route("/me/", get(me))
        .layer(middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware))
        .with_state(shared_state.clone());

    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/register-with-referral/", post(register_with_referral))
        .with_state(shared_state)
        .merge(protected)
}

/// Router for the referred-users listing, mounted under the referrals prefix
pub fn referred_router<U: UserRepository + 'static>(service: UserService<U>) -> Router {
    Router::new()
        .route("/referrals/{user_id}", get(list_referred))
        .with_state(Arc::new(service))
}

/// Register a new user
///
/// POST /register/
async fn register<U, R, C>(
    State(state): State<Arc<AuthState<U, R, C>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, UserError>
where
    U: UserRepository,
    R: ReferralRepository,
    C: ReferralCache,
{
    let user = state.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Query parameter carrying the referral code to redeem
#[derive(Debug, Deserialize)]
struct ReferralCodeQuery {
    referral_code: String,
}

/// Register a new user through a referral code
///
/// POST /register-with-referral/?referral_code=<code>
async fn register_with_referral<U, R, C>(
    State(state): State<Arc<AuthState<U, R, C>>>,
    Query(query): Query<ReferralCodeQuery>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, UserError>
where
    U: UserRepository,
    R: ReferralRepository,
    C: ReferralCache,
{
    let registered = state
        .users
        .register_with_referral(input, &query.referral_code, &state.referrals)
        .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

/// Login with email/password, issuing a bearer token
///
/// POST /login/
async fn login<U, R, C>(
    State(state): State<Arc<AuthState<U, R, C>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, UserError>
where
    U: UserRepository,
    R: ReferralRepository,
    C: ReferralCache,
{
    let user = state
        .users
        .verify_credentials(&input.email, &input.password)
        .await?;

    let access_token = state.jwt_auth.create_access_token(&user.email).map_err(|e| {
        tracing::error!("Failed to create access token: {:?}", e);
        UserError::Internal("Failed to create token".to_string())
    })?;

    Ok(Json(TokenResponse {
        user_id: user.id,
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Return the authenticated user
///
/// GET /me/ (bearer token required)
async fn me<U, R, C>(
    State(state): State<Arc<AuthState<U, R, C>>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<UserResponse>, UserError>
where
    U: UserRepository,
    R: ReferralRepository,
    C: ReferralCache,
{
    let user = state.users.get_by_email(&claims.sub).await?;
    Ok(Json(user))
}

/// List the users referred by an owner
///
/// GET /referrals/{user_id}
async fn list_referred<U: UserRepository>(
    State(service): State<Arc<UserService<U>>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ReferredUserResponse>>, UserError> {
    let referred = service.list_referred(user_id).await?;
    Ok(Json(referred))
}
