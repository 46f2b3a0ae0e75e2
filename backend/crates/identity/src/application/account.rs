//! Account Lookup and Profile Maintenance

use crate::application::engine::AuthEngine;
use crate::application::register::check_name;
use crate::domain::entity::account::{Account, AccountFilter, AccountUpdate};
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{email::Email, ids::AccountId, username::Username};
use crate::error::{IdentityError, IdentityResult, ValidationErrors};

/// Requested profile edits. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl ProfileChanges {
    fn into_update(self) -> IdentityResult<AccountUpdate> {
        let mut errors = ValidationErrors::new();
        let mut update = AccountUpdate::new();

        if let Some(raw) = self.username {
            if let Some(username) = errors.check("username", Username::new(raw)) {
                update = update.username(username);
            }
        }
        if let Some(raw) = self.email {
            if let Some(email) = errors.check("email", Email::new(raw)) {
                update = update.email(email);
            }
        }
        if let Some(first_name) = self.first_name {
            check_name(&mut errors, "first_name", &first_name);
            update = update.first_name(first_name.trim());
        }
        if let Some(last_name) = self.last_name {
            check_name(&mut errors, "last_name", &last_name);
            update = update.last_name(last_name.trim());
        }
        if let Some(is_active) = self.is_active {
            update = update.active(is_active);
        }
        if let Some(is_superuser) = self.is_superuser {
            update = update.superuser(is_superuser);
        }

        errors.into_result()?;
        Ok(update)
    }
}

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    /// Does a record exist for `id` and/or `username`?
    ///
    /// At least one must be given (zero id and blank name count as absent).
    /// With both, the same record must carry both.
    pub async fn account_exists(
        &self,
        id: Option<AccountId>,
        username: Option<&str>,
    ) -> IdentityResult<bool> {
        let id = id.filter(|id| !id.is_unset());
        let username = username.map(str::trim).filter(|u| !u.is_empty());

        if id.is_none() && username.is_none() {
            return Err(IdentityError::InvalidArgument(
                "either account id or username must be provided".to_string(),
            ));
        }

        let filter = AccountFilter {
            id,
            username: username.map(str::to_string),
        };
        Ok(self.accounts.exists(&filter).await?)
    }

    pub async fn get_account(&self, id: AccountId) -> IdentityResult<Account> {
        self.load_account(id).await
    }

    /// Verify `token` and load the account it names
    pub async fn account_from_token(&self, token: &str) -> IdentityResult<Account> {
        let claims = self.tokens.verify(token)?;
        self.load_account(claims.user_id).await
    }

    /// Apply profile edits and return the stored result
    pub async fn update_profile(
        &self,
        id: AccountId,
        changes: ProfileChanges,
    ) -> IdentityResult<Account> {
        let update = changes.into_update()?;
        if !update.is_empty() {
            self.accounts.update(id, &update).await?;
            tracing::info!(account_id = %id, "Profile updated");
        }
        self.load_account(id).await
    }
}
