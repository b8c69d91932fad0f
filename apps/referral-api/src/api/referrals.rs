use axum::Router;
use domain_referrals::{handlers, PostgresReferralRepository, RedisReferralCache, ReferralService};
use domain_users::{handlers::referred_router, PostgresUserRepository, UserService};

pub fn router(state: &crate::AppState) -> Router {
    let referrals = ReferralService::new(
        PostgresReferralRepository::new(state.db.clone()),
        RedisReferralCache::new(state.redis.clone()),
    );
    let users = UserService::new(PostgresUserRepository::new(state.db.clone()));

    // Code lifecycle endpoints plus the referred-users listing, which is a
    // users-table query and therefore served by the users domain
    handlers::router(referrals).merge(referred_router(users))
}
