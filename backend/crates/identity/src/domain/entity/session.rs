//! Session Claims
//!
//! Identity carried inside a signed session token. Rebuilt from the token
//! on every verification, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::entity::account::Account;
use crate::domain::value_object::ids::AccountId;

/// JWT payload. `iat` / `exp` are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: AccountId,
    pub username: String,
    pub is_superuser: bool,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_account(
        account: &Account,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: account.id,
            username: account.username.as_str().to_string(),
            is_superuser: account.is_superuser,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A signed token and the claims it carries
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let claims = SessionClaims {
            user_id: AccountId::from_raw(1),
            username: "a@x.com".into(),
            is_superuser: false,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["username"], "a@x.com");
        assert_eq!(json["is_superuser"], false);
        assert_eq!(json["exp"], 1_700_086_400);
        assert_eq!(claims.expires_at().timestamp(), 1_700_086_400);
    }
}
