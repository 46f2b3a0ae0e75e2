//! Authentication and Login

use chrono::Utc;

use crate::application::engine::AuthEngine;
use crate::domain::entity::{
    account::{Account, AccountUpdate},
    session::IssuedToken,
};
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::error::{IdentityError, IdentityResult};

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    /// Check `identifier` (username or email) and password.
    ///
    /// `AccountNotFound` and `InvalidPassword` stay distinct here; the HTTP
    /// layer merges them. Recording the login time is best effort.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> IdentityResult<Account> {
        let mut account = self
            .accounts
            .find_by_login(identifier.trim())
            .await?
            .ok_or(IdentityError::AccountNotFound)?;

        let raw = self.check_password(&account, password)?;

        let now = Utc::now();
        let mut changes = AccountUpdate::new().last_login(now);
        if account.password_hash.needs_rehash() {
            match self.hash_password(&raw) {
                Ok(hash) => changes = changes.rehash(hash),
                Err(e) => tracing::warn!(account_id = %account.id, error = %e, "Rehash failed"),
            }
        }

        match self.accounts.update(account.id, &changes).await {
            Ok(()) => account.apply(&changes),
            Err(e) => {
                tracing::warn!(
                    account_id = %account.id,
                    error = %e,
                    "Failed to record last login"
                );
            }
        }

        Ok(account)
    }

    /// Authenticate, then issue a session token.
    ///
    /// Authentication errors are returned as-is. A signing failure does not
    /// discard the authenticated account: it comes back next to the token
    /// error.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> IdentityResult<(Account, IdentityResult<IssuedToken>)> {
        let account = self.authenticate(identifier, password).await?;
        let token = self.tokens.issue(&account);

        match &token {
            Ok(_) => tracing::info!(account_id = %account.id, "Account logged in"),
            Err(e) => tracing::error!(account_id = %account.id, error = %e, "Token issuance failed"),
        }

        Ok((account, token))
    }
}
