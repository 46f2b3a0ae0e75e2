//! Password Change and Reset

use chrono::Utc;

use crate::application::engine::AuthEngine;
use crate::domain::entity::account::AccountUpdate;
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{ids::AccountId, password::RawPassword};
use crate::error::{IdentityError, IdentityResult, ValidationErrors};

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    /// Replace the password after checking the current one
    pub async fn change_password(
        &self,
        account_id: AccountId,
        current: &str,
        new: &str,
    ) -> IdentityResult<()> {
        let account = self.load_account(account_id).await?;
        self.check_password(&account, current)?;

        self.store_password(account_id, new).await?;
        tracing::info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    /// Replace the password without the current one.
    ///
    /// Callers are responsible for authorizing this (superuser route,
    /// verified OTP, ...).
    pub async fn reset_password(&self, account_id: AccountId, new: &str) -> IdentityResult<()> {
        self.store_password(account_id, new).await?;
        tracing::info!(account_id = %account_id, "Password reset");
        Ok(())
    }

    /// Hash and write together with the change timestamp, one update
    async fn store_password(&self, account_id: AccountId, new: &str) -> IdentityResult<()> {
        let mut errors = ValidationErrors::new();
        let Some(raw) = errors.check("new_password", RawPassword::new(new)) else {
            return Err(IdentityError::Validation(errors));
        };

        let hash = self.hash_password(&raw)?;
        self.accounts
            .update(account_id, &AccountUpdate::new().password(hash, Utc::now()))
            .await?;
        Ok(())
    }
}
