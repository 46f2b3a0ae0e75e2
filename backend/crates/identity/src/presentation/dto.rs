//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::account::ProfileChanges;
use crate::domain::entity::account::{Account, AccountDraft};
use crate::domain::entity::session::IssuedToken;
use crate::domain::value_object::ids::AccountId;

// ============================================================================
// Registration
// ============================================================================

/// Registration request. A missing or blank username means "use the email".
#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterRequest {
    /// Split into the account draft and the plaintext password
    pub fn into_draft(self) -> (AccountDraft, String) {
        let draft = AccountDraft::new(self.email)
            .with_username(self.username)
            .with_names(self.first_name, self.last_name);
        (draft, self.password)
    }
}

/// Registration response (201)
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub message: &'static str,
}

impl From<Account> for RegisterResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email.into_inner(),
            username: account.username.as_str().to_string(),
            first_name: account.first_name,
            last_name: account.last_name,
            message: "User registered successfully",
        }
    }
}

// ============================================================================
// Login / Refresh
// ============================================================================

/// Login request
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Login and refresh response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: AccountId,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        let expires_at = issued.expires_at();
        Self {
            token: issued.token,
            expires_at,
            user_id: issued.claims.user_id,
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Profile response
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user_id: AccountId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Account> for ProfileResponse {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.id,
            username: account.username.as_str().to_string(),
            email: account.email.into_inner(),
            first_name: account.first_name,
            last_name: account.last_name,
            is_superuser: account.is_superuser,
            date_joined: account.date_joined,
            last_login: account.last_login,
        }
    }
}

/// Self-service profile edits. Absent or blank username / email are left
/// unchanged; names are written as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            username: present(req.username),
            email: present(req.email),
            first_name: req.first_name,
            last_name: req.last_name,
            ..Default::default()
        }
    }
}

// ============================================================================
// Password
// ============================================================================

/// Change password request
#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Administrative password reset
#[derive(Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub user_id: AccountId,
    pub new_password: String,
}

// ============================================================================
// Misc
// ============================================================================

/// Plain confirmation body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body of the role-gated greeting routes
#[derive(Debug, Clone, Serialize)]
pub struct AreaResponse {
    pub message: &'static str,
    pub user_id: AccountId,
    pub username: String,
}
