//! In-process credential store
//!
//! Same contract as the PostgreSQL store, held behind one mutex. Used by
//! tests and by embedders that do not need durability.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    account::{Account, AccountFilter, AccountUpdate, NewAccount},
    otp::{NewOtp, OtpRecord},
};
use crate::domain::repository::{
    AccountRepository, OtpRepository, StoreError, StoreResult, UniqueField,
};
use crate::domain::value_object::{
    email::Email,
    ids::{AccountId, OtpId},
    otp_code::OtpCode,
    username::Username,
};

#[derive(Default)]
struct State {
    accounts: BTreeMap<i64, Account>,
    otps: BTreeMap<i64, OtpRecord>,
    last_account_id: i64,
    last_otp_id: i64,
}

impl State {
    /// Unique-index check, ignoring the row being updated
    fn check_unique(
        &self,
        skip: Option<AccountId>,
        username: Option<&Username>,
        email: Option<&Email>,
    ) -> StoreResult<()> {
        for account in self.accounts.values() {
            if Some(account.id) == skip {
                continue;
            }
            if email.is_some_and(|e| e == &account.email) {
                return Err(StoreError::UniqueViolation(UniqueField::Email));
            }
            if username.is_some_and(|u| u == &account.username) {
                return Err(StoreError::UniqueViolation(UniqueField::Username));
            }
        }
        Ok(())
    }
}

/// Mutex-guarded map store; clones share state
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    state: Arc<Mutex<State>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("credential store lock poisoned".into()))
    }

    /// Every stored code of an account, oldest first
    pub fn otps_for(&self, account_id: AccountId) -> StoreResult<Vec<OtpRecord>> {
        Ok(self
            .lock()?
            .otps
            .values()
            .filter(|otp| otp.account_id == account_id)
            .cloned()
            .collect())
    }

    /// Move every code of an account past its expiry
    #[cfg(test)]
    pub(crate) fn expire_otps(&self, account_id: AccountId) {
        let mut state = self.state.lock().unwrap();
        for otp in state.otps.values_mut() {
            if otp.account_id == account_id {
                otp.expires_at = Utc::now() - chrono::Duration::seconds(1);
            }
        }
    }
}

impl AccountRepository for MemoryCredentialStore {
    async fn create(&self, account: &NewAccount) -> StoreResult<AccountId> {
        let mut state = self.lock()?;
        state.check_unique(None, Some(&account.username), Some(&account.email))?;

        state.last_account_id += 1;
        let id = AccountId::from_raw(state.last_account_id);
        state.accounts.insert(
            id.get(),
            Account {
                id,
                username: account.username.clone(),
                email: account.email.clone(),
                password_hash: account.password_hash.clone(),
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                is_active: account.is_active,
                is_superuser: account.is_superuser,
                date_joined: account.date_joined,
                last_login: None,
                password_changed: Some(account.password_changed),
            },
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id.get()).cloned())
    }

    async fn find_by_login(&self, identifier: &str) -> StoreResult<Option<Account>> {
        let email = identifier.to_lowercase();
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.username.as_str() == identifier || a.email.as_str() == email)
            .cloned())
    }

    async fn exists(&self, filter: &AccountFilter) -> StoreResult<bool> {
        Ok(self.lock()?.accounts.values().any(|a| filter.matches(a)))
    }

    async fn update(&self, id: AccountId, changes: &AccountUpdate) -> StoreResult<()> {
        let mut state = self.lock()?;
        if !state.accounts.contains_key(&id.get()) {
            return Err(StoreError::NotFound);
        }
        state.check_unique(Some(id), changes.username.as_ref(), changes.email.as_ref())?;

        if let Some(account) = state.accounts.get_mut(&id.get()) {
            account.apply(changes);
        }
        Ok(())
    }
}

impl OtpRepository for MemoryCredentialStore {
    async fn create(&self, otp: &NewOtp) -> StoreResult<OtpId> {
        let mut state = self.lock()?;
        if !state.accounts.contains_key(&otp.account_id.get()) {
            return Err(StoreError::NotFound);
        }

        state.last_otp_id += 1;
        let id = OtpId::from_raw(state.last_otp_id);
        state.otps.insert(
            id.get(),
            OtpRecord {
                id,
                account_id: otp.account_id,
                code: otp.code.clone(),
                expires_at: otp.expires_at,
                verified: false,
            },
        );

        Ok(id)
    }

    async fn delete_for_account(&self, account_id: AccountId) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let before = state.otps.len();
        state.otps.retain(|_, otp| otp.account_id != account_id);
        Ok((before - state.otps.len()) as u64)
    }

    async fn find_active(
        &self,
        account_id: AccountId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<OtpRecord>> {
        Ok(self
            .lock()?
            .otps
            .values()
            .rev()
            .find(|otp| otp.account_id == account_id && otp.is_active(now) && otp.code.matches(code))
            .cloned())
    }

    async fn mark_verified(&self, id: OtpId) -> StoreResult<bool> {
        let mut state = self.lock()?;
        match state.otps.get_mut(&id.get()) {
            Some(otp) if !otp.verified => {
                otp.verified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::password::{PasswordHash, RawPassword};
    use chrono::Duration;

    fn new_account(username: &str, email: &str) -> NewAccount {
        let raw = RawPassword::new("Secret1!").unwrap();
        NewAccount {
            username: Username::new(username).unwrap(),
            email: Email::new(email).unwrap(),
            password_hash: PasswordHash::from_raw(&raw, None).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: false,
            date_joined: Utc::now(),
            password_changed: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = MemoryCredentialStore::new();
        let a = AccountRepository::create(&store, &new_account("alice", "a@x.com")).await.unwrap();
        let b = AccountRepository::create(&store, &new_account("bob", "b@x.com")).await.unwrap();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[tokio::test]
    async fn test_unique_violations() {
        let store = MemoryCredentialStore::new();
        AccountRepository::create(&store, &new_account("alice", "a@x.com")).await.unwrap();

        let dup_email = AccountRepository::create(&store, &new_account("other", "A@X.com")).await;
        assert!(matches!(
            dup_email,
            Err(StoreError::UniqueViolation(UniqueField::Email))
        ));

        let dup_name = AccountRepository::create(&store, &new_account("alice", "c@x.com")).await;
        assert!(matches!(
            dup_name,
            Err(StoreError::UniqueViolation(UniqueField::Username))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let store = MemoryCredentialStore::new();
        AccountRepository::create(&store, &new_account("alice", "a@x.com")).await.unwrap();
        let bob = AccountRepository::create(&store, &new_account("bob", "b@x.com")).await.unwrap();

        let taken = AccountUpdate::new().username(Username::new("alice").unwrap());
        assert!(matches!(
            store.update(bob, &taken).await,
            Err(StoreError::UniqueViolation(UniqueField::Username))
        ));

        // renaming to its own current name is not a conflict
        let same = AccountUpdate::new().username(Username::new("bob").unwrap());
        assert!(store.update(bob, &same).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryCredentialStore::new();
        let result = store
            .update(AccountId::from_raw(9), &AccountUpdate::new().first_name("x"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_by_login_prefers_lowest_id() {
        let store = MemoryCredentialStore::new();
        // account 1 has email "b@x.com"; account 2 has username "b@x.com"
        AccountRepository::create(&store, &new_account("first", "b@x.com")).await.unwrap();
        AccountRepository::create(&store, &new_account("b@x.com", "z@x.com")).await.unwrap();

        let found = store.find_by_login("b@x.com").await.unwrap().unwrap();
        assert_eq!(found.id.get(), 1);

        let by_upper_email = store.find_by_login("Z@X.COM").await.unwrap().unwrap();
        assert_eq!(by_upper_email.id.get(), 2);

        assert!(store.find_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_otp_lifecycle() {
        let store = MemoryCredentialStore::new();
        let account = AccountRepository::create(&store, &new_account("alice", "a@x.com")).await.unwrap();
        let code = OtpCode::parse("123456").unwrap();

        let id = OtpRepository::create(
            &store,
            &NewOtp {
                account_id: account,
                code: code.clone(),
                expires_at: Utc::now() + Duration::minutes(5),
            },
        )
        .await
        .unwrap();

        let found = store.find_active(account, &code, Utc::now()).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(id));

        assert!(store.mark_verified(id).await.unwrap());
        assert!(!store.mark_verified(id).await.unwrap());
        assert!(store.find_active(account, &code, Utc::now()).await.unwrap().is_none());

        assert_eq!(store.delete_for_account(account).await.unwrap(), 1);
        assert!(store.otps_for(account).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_otp_not_active() {
        let store = MemoryCredentialStore::new();
        let account = AccountRepository::create(&store, &new_account("alice", "a@x.com")).await.unwrap();
        let code = OtpCode::parse("123456").unwrap();
        OtpRepository::create(
            &store,
            &NewOtp {
                account_id: account,
                code: code.clone(),
                expires_at: Utc::now() + Duration::minutes(5),
            },
        )
        .await
        .unwrap();

        store.expire_otps(account);
        assert!(store.find_active(account, &code, Utc::now()).await.unwrap().is_none());
    }
}
