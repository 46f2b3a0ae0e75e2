//! Auth Engine
//!
//! Orchestrates registration, authentication, password lifecycle and OTPs
//! over the credential store. Holds no per-request state; clones share the
//! same store, codec and config.

use std::sync::Arc;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::domain::value_object::{
    ids::AccountId,
    password::{PasswordHash, RawPassword},
};
use crate::error::{IdentityError, IdentityResult};

pub struct AuthEngine<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    pub(crate) accounts: Arc<A>,
    pub(crate) otps: Arc<O>,
    pub(crate) tokens: Arc<TokenCodec>,
    pub(crate) config: Arc<IdentityConfig>,
}

impl<A, O> Clone for AuthEngine<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            otps: Arc::clone(&self.otps),
            tokens: Arc::clone(&self.tokens),
            config: Arc::clone(&self.config),
        }
    }
}

impl<A, O> AuthEngine<A, O>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    pub fn new(accounts: Arc<A>, otps: Arc<O>, config: Arc<IdentityConfig>) -> Self {
        let tokens = Arc::new(TokenCodec::new(&config));
        Self {
            accounts,
            otps,
            tokens,
            config,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenCodec> {
        &self.tokens
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub(crate) async fn load_account(&self, id: AccountId) -> IdentityResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }

    pub(crate) fn hash_password(&self, raw: &RawPassword) -> IdentityResult<PasswordHash> {
        PasswordHash::from_raw(raw, self.config.pepper())
            .map_err(|e| IdentityError::Internal(e.to_string()))
    }

    /// Shared by authentication and password change.
    /// Input that could never have been stored simply does not match.
    pub(crate) fn check_password(&self, account: &Account, plaintext: &str) -> IdentityResult<RawPassword> {
        let raw = RawPassword::new(plaintext).map_err(|_| IdentityError::InvalidPassword)?;
        if account.password_hash.verify(&raw, self.config.pepper()) {
            Ok(raw)
        } else {
            Err(IdentityError::InvalidPassword)
        }
    }
}
