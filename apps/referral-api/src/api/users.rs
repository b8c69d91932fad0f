use axum::Router;
use domain_referrals::{PostgresReferralRepository, RedisReferralCache, ReferralService};
use domain_users::{handlers, handlers::AuthState, PostgresUserRepository, UserService};

pub fn router(state: &crate::AppState) -> Router {
    let users = UserService::new(PostgresUserRepository::new(state.db.clone()));
    let referrals = ReferralService::new(
        PostgresReferralRepository::new(state.db.clone()),
        RedisReferralCache::new(state.redis.clone()),
    );

    handlers::router(AuthState {
        users,
        referrals,
        jwt_auth: state.jwt_auth.clone(),
    })
}
