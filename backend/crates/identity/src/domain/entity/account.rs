//! Account Entity
//!
//! The identity record. `id` is assigned by storage on insert and never
//! changes; `username` and `email` are each unique across all accounts.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, ids::AccountId, password::PasswordHash, username::Username,
};

/// Stored account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: Email,
    /// Never serialized outward
    pub password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    /// Last successful authentication
    pub last_login: Option<DateTime<Utc>>,
    pub password_changed: Option<DateTime<Utc>>,
}

impl Account {
    /// Overwrite the fields an update touches. Used by in-process stores;
    /// SQL stores translate the same update into one `UPDATE`.
    pub fn apply(&mut self, changes: &AccountUpdate) {
        if let Some(username) = &changes.username {
            self.username = username.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(first_name) = &changes.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if let Some(is_superuser) = changes.is_superuser {
            self.is_superuser = is_superuser;
        }
        if let Some(hash) = &changes.rehashed {
            self.password_hash = hash.clone();
        }
        if let Some((hash, changed_at)) = &changes.password {
            self.password_hash = hash.clone();
            self.password_changed = Some(*changed_at);
        }
        if let Some(at) = changes.last_login {
            self.last_login = Some(at);
        }
    }
}

/// Caller-supplied registration data, not yet validated.
///
/// An empty `username` means "use the email".
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl Default for AccountDraft {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: false,
        }
    }
}

impl AccountDraft {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }
}

/// Validated, hashed row ready for insertion
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub password_changed: DateTime<Utc>,
}

/// Typed partial update.
///
/// Only `Some` fields are written. The password hash and its change
/// timestamp live in one field so neither can be written alone.
///
/// ```rust
/// use chrono::Utc;
/// use identity::domain::entity::account::AccountUpdate;
///
/// let update = AccountUpdate::new().last_login(Utc::now());
/// assert!(!update.is_empty());
/// assert!(AccountUpdate::new().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub password: Option<(PasswordHash, DateTime<Utc>)>,
    /// Same password under current hash parameters; change time untouched
    pub rehashed: Option<PasswordHash>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AccountUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: Username) -> Self {
        self.username = Some(username);
        self
    }

    pub fn email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = Some(is_superuser);
        self
    }

    /// New hash plus the moment it was set
    pub fn password(mut self, hash: PasswordHash, changed_at: DateTime<Utc>) -> Self {
        self.password = Some((hash, changed_at));
        self
    }

    pub fn rehash(mut self, hash: PasswordHash) -> Self {
        self.rehashed = Some(hash);
        self
    }

    pub fn last_login(mut self, at: DateTime<Utc>) -> Self {
        self.last_login = Some(at);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.password.is_none()
            && self.rehashed.is_none()
            && self.last_login.is_none()
    }
}

/// Existence probe. With both fields set, both must match the same row.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub id: Option<AccountId>,
    pub username: Option<String>,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        let id_ok = self.id.is_none_or(|id| id == account.id);
        let name_ok = self
            .username
            .as_deref()
            .is_none_or(|name| name == account.username.as_str());
        id_ok && name_ok && (self.id.is_some() || self.username.is_some())
    }
}
