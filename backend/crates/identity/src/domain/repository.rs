//! Repository Traits
//!
//! The credential store contract. Implementations live in the
//! infrastructure layer; consistency (row atomicity, unique constraints)
//! is theirs to guarantee.

use chrono::{DateTime, Utc};
use derive_more::Display;
use thiserror::Error;

use crate::domain::entity::{
    account::{Account, AccountFilter, AccountUpdate, NewAccount},
    otp::{NewOtp, OtpRecord},
};
use crate::domain::value_object::{
    ids::{AccountId, OtpId},
    otp_code::OtpCode,
};

/// Column guarded by a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UniqueField {
    #[display("email")]
    Email,
    #[display("username")]
    Username,
}

/// Store-level failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Account persistence
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert and return the storage-assigned id
    async fn create(&self, account: &NewAccount) -> StoreResult<AccountId>;

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Single lookup matching username OR (lower-cased) email.
    /// Lowest id wins if both columns match different rows.
    async fn find_by_login(&self, identifier: &str) -> StoreResult<Option<Account>>;

    async fn exists(&self, filter: &AccountFilter) -> StoreResult<bool>;

    /// Write the `Some` fields of `changes` in one statement.
    /// `StoreError::NotFound` when no row has `id`.
    async fn update(&self, id: AccountId, changes: &AccountUpdate) -> StoreResult<()>;
}

/// OTP persistence
#[trait_variant::make(OtpRepository: Send)]
pub trait LocalOtpRepository {
    async fn create(&self, otp: &NewOtp) -> StoreResult<OtpId>;

    /// Remove every code of the account, returning the count
    async fn delete_for_account(&self, account_id: AccountId) -> StoreResult<u64>;

    /// The predicate (account, exact code, `expires_at > now`, not verified)
    /// is part of the lookup, so stale rows never come back.
    async fn find_active(
        &self,
        account_id: AccountId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<OtpRecord>>;

    /// Flip `verified` if still unset. `false` means another caller won.
    async fn mark_verified(&self, id: OtpId) -> StoreResult<bool>;
}
