//! One-Time Passcodes
//!
//! Issuing deletes every earlier code of the account first, then inserts
//! the new one. The two steps are not one transaction: concurrent issues
//! for the same account may leave more than one live code.

use chrono::{Duration, Utc};

use crate::application::engine::AuthEngine;
use crate::domain::entity::{account::AccountFilter, otp::NewOtp};
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{ids::AccountId, otp_code::OtpCode};
use crate::error::{IdentityError, IdentityResult};

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    /// Issue a fresh code for `account_id`.
    ///
    /// `length == 0` and non-positive `validity` fall back to the
    /// configured defaults. Invalid input is rejected before earlier codes
    /// are discarded.
    pub async fn issue_otp(
        &self,
        account_id: AccountId,
        length: usize,
        validity: Duration,
    ) -> IdentityResult<OtpCode> {
        let length = if length == 0 {
            self.config.otp_length
        } else {
            length
        };
        let validity = if validity <= Duration::zero() {
            self.config.otp_ttl_chrono()
        } else {
            validity
        };

        let filter = AccountFilter {
            id: Some(account_id),
            username: None,
        };
        if !self.accounts.exists(&filter).await? {
            return Err(IdentityError::AccountNotFound);
        }

        let code = OtpCode::generate(length)
            .map_err(|e| IdentityError::InvalidArgument(e.message().to_string()))?;
        let expires_at = Utc::now().checked_add_signed(validity).ok_or_else(|| {
            IdentityError::InvalidArgument("OTP validity is out of range".to_string())
        })?;

        let replaced = self.otps.delete_for_account(account_id).await?;
        self.otps
            .create(&NewOtp {
                account_id,
                code: code.clone(),
                expires_at,
            })
            .await?;

        tracing::info!(
            account_id = %account_id,
            replaced,
            valid_for_secs = validity.num_seconds(),
            "OTP issued"
        );

        Ok(code)
    }

    /// Issue with the configured length and validity
    pub async fn issue_default_otp(&self, account_id: AccountId) -> IdentityResult<OtpCode> {
        self.issue_otp(account_id, 0, Duration::zero()).await
    }

    /// Consume a live code. The code must match exactly, surrounding
    /// whitespace included. A wrong, expired, already used or malformed
    /// code is `Ok(false)`, not an error.
    pub async fn verify_otp(&self, account_id: AccountId, code: &str) -> IdentityResult<bool> {
        let Ok(code) = OtpCode::parse(code) else {
            return Ok(false);
        };

        let Some(record) = self
            .otps
            .find_active(account_id, &code, Utc::now())
            .await?
        else {
            tracing::debug!(account_id = %account_id, "No live OTP matched");
            return Ok(false);
        };

        let consumed = self.otps.mark_verified(record.id).await?;
        if consumed {
            tracing::info!(account_id = %account_id, "OTP verified");
        }

        Ok(consumed)
    }
}
