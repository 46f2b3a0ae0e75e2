//! OTP Record Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    ids::{AccountId, OtpId},
    otp_code::OtpCode,
};

/// Stored one-time passcode.
///
/// Consumed codes keep their row with `verified = true`.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: OtpId,
    pub account_id: AccountId,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
}

impl OtpRecord {
    /// Unexpired and not yet consumed
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.verified && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewOtp {
    pub account_id: AccountId,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}
