//! Registration

use chrono::Utc;

use crate::application::engine::AuthEngine;
use crate::domain::entity::account::{AccountDraft, NewAccount};
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{
    email::Email, ids::AccountId, password::RawPassword, username::Username,
};
use crate::error::{IdentityError, IdentityResult, ValidationErrors};

/// Maximum length of first / last name
pub const NAME_MAX_LENGTH: usize = 50;

/// Record a violation if `value` is longer than [`NAME_MAX_LENGTH`]
pub(crate) fn check_name(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.chars().count() > NAME_MAX_LENGTH {
        errors.push(
            field,
            format!("must be at most {} characters", NAME_MAX_LENGTH),
        );
    }
}

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    /// Create an account and return its storage-assigned id.
    ///
    /// An empty username defaults to the (normalized) email. All field
    /// problems are reported together in one `Validation` error.
    pub async fn register(
        &self,
        draft: AccountDraft,
        password: &str,
    ) -> IdentityResult<AccountId> {
        let mut errors = ValidationErrors::new();

        let email = errors.check("email", Email::new(&draft.email));
        let username = if draft.username.trim().is_empty() {
            // A bad email is already reported; don't echo it as a username error
            email.as_ref().and_then(|e| errors.check("username", Username::new(e.as_str())))
        } else {
            errors.check("username", Username::new(&draft.username))
        };
        let password = errors.check("password", RawPassword::new(password));
        check_name(&mut errors, "first_name", &draft.first_name);
        check_name(&mut errors, "last_name", &draft.last_name);

        let (Some(email), Some(username), Some(password)) = (email, username, password) else {
            return Err(IdentityError::Validation(errors));
        };
        errors.into_result()?;

        let now = Utc::now();
        let account = NewAccount {
            username,
            email,
            password_hash: self.hash_password(&password)?,
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            is_active: draft.is_active,
            is_superuser: draft.is_superuser,
            date_joined: now,
            password_changed: now,
        };

        let id = self.accounts.create(&account).await?;

        tracing::info!(
            account_id = %id,
            username = %account.username,
            "Account registered"
        );

        Ok(id)
    }
}
