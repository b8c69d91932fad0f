use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Referral code entity - matches SQL schema
///
/// A code belongs to exactly one owner and an owner holds at most one code at
/// a time (UNIQUE constraint on `owner_id`). Expiry is a property of the
/// record; it is only *enforced* at redemption, so an expired code remains
/// lookupable and deletable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferralCode {
    /// Unique identifier
    pub id: i64,
    /// Unique code token handed out to prospective registrants
    pub code: String,
    /// Owning user
    pub owner_id: i64,
    /// Moment after which the code can no longer be redeemed
    pub expires_at: DateTime<Utc>,
}

impl ReferralCode {
    /// Whether the code is past its expiry at the given instant.
    ///
    /// Callers on the redemption path are the only ones that should care.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// DTO for creating a referral code
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReferral {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Referral code response DTO
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferralResponse {
    pub user_id: i64,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl From<ReferralCode> for ReferralResponse {
    fn from(referral: ReferralCode) -> Self {
        Self {
            user_id: referral.owner_id,
            code: referral.code,
            expires_at: referral.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_expired_at() {
        let referral = ReferralCode {
            id: 1,
            code: "ABC123".to_string(),
            owner_id: 1,
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        };

        let before = Utc.with_ymd_and_hms(2029, 12, 31, 23, 59, 59).unwrap();
        let at = referral.expires_at;
        let after = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 1).unwrap();

        assert!(!referral.is_expired_at(before));
        // Expiry is strict: the boundary instant itself still redeems
        assert!(!referral.is_expired_at(at));
        assert!(referral.is_expired_at(after));
    }
}
