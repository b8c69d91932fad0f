use utoipa::OpenApi;

/// Referral service API documentation
#[derive(OpenApi)]
#[openapi(
    components(schemas(
        domain_users::RegisterRequest,
        domain_users::LoginRequest,
        domain_users::UserResponse,
        domain_users::ReferredRegistrationResponse,
        domain_users::ReferredUserResponse,
        domain_users::TokenResponse,
        domain_referrals::CreateReferral,
        domain_referrals::ReferralResponse,
        axum_helpers::ErrorResponse,
    )),
    tags(
        (name = "users", description = "Registration, login, referral redemption"),
        (name = "referrals", description = "Referral code lifecycle")
    )
)]
pub struct ApiDoc;
