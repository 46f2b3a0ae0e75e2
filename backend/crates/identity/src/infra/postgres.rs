//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

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
    password::PasswordHash,
    username::Username,
};

/// Unique index names from the `accounts` migration
const EMAIL_CONSTRAINT: &str = "idx_accounts_email";
const USERNAME_CONSTRAINT: &str = "idx_accounts_username";

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete codes whose validity window has closed
    pub async fn purge_expired_otps(&self) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM otps WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(otps_deleted = deleted, "Purged expired OTPs");

        Ok(deleted)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => StoreError::UniqueViolation(UniqueField::Email),
                    Some(USERNAME_CONSTRAINT) => StoreError::UniqueViolation(UniqueField::Username),
                    _ => StoreError::Backend(err.to_string()),
                }
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgCredentialStore {
    async fn create(&self, account: &NewAccount) -> StoreResult<AccountId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (
                username,
                email,
                password_hash,
                first_name,
                last_name,
                is_active,
                is_superuser,
                date_joined,
                password_changed
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.is_active)
        .bind(account.is_superuser)
        .bind(account.date_joined)
        .bind(account.password_changed)
        .fetch_one(&self.pool)
        .await?;

        Ok(AccountId::from_raw(id))
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                username,
                email,
                password_hash,
                first_name,
                last_name,
                is_active,
                is_superuser,
                date_joined,
                last_login,
                password_changed
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_login(&self, identifier: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                id,
                username,
                email,
                password_hash,
                first_name,
                last_name,
                is_active,
                is_superuser,
                date_joined,
                last_login,
                password_changed
            FROM accounts
            WHERE username = $1 OR email = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .bind(identifier.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn exists(&self, filter: &AccountFilter) -> StoreResult<bool> {
        if filter.id.is_none() && filter.username.is_none() {
            return Ok(false);
        }

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM accounts
                WHERE ($1::BIGINT IS NULL OR id = $1)
                  AND ($2::TEXT IS NULL OR username = $2)
            )
            "#,
        )
        .bind(filter.id.map(|id| id.get()))
        .bind(filter.username.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, id: AccountId, changes: &AccountUpdate) -> StoreResult<()> {
        if changes.is_empty() {
            let filter = AccountFilter {
                id: Some(id),
                username: None,
            };
            return if self.exists(&filter).await? {
                Ok(())
            } else {
                Err(StoreError::NotFound)
            };
        }

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE accounts SET ");
        let mut set = query.separated(", ");

        if let Some(username) = &changes.username {
            set.push("username = ")
                .push_bind_unseparated(username.as_str().to_string());
        }
        if let Some(email) = &changes.email {
            set.push("email = ")
                .push_bind_unseparated(email.as_str().to_string());
        }
        if let Some(first_name) = &changes.first_name {
            set.push("first_name = ")
                .push_bind_unseparated(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            set.push("last_name = ").push_bind_unseparated(last_name.clone());
        }
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
        if let Some(is_superuser) = changes.is_superuser {
            set.push("is_superuser = ").push_bind_unseparated(is_superuser);
        }
        // a new password supersedes a rehash of the old one
        if let Some((hash, changed_at)) = &changes.password {
            set.push("password_hash = ")
                .push_bind_unseparated(hash.as_phc_string().to_string());
            set.push("password_changed = ")
                .push_bind_unseparated(*changed_at);
        } else if let Some(hash) = &changes.rehashed {
            set.push("password_hash = ")
                .push_bind_unseparated(hash.as_phc_string().to_string());
        }
        if let Some(at) = changes.last_login {
            set.push("last_login = ").push_bind_unseparated(at);
        }

        query.push(" WHERE id = ").push_bind(id.get());

        let affected = query
            .build()
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

// ============================================================================
// OTP Repository Implementation
// ============================================================================

impl OtpRepository for PgCredentialStore {
    async fn create(&self, otp: &NewOtp) -> StoreResult<OtpId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO otps (account_id, otp_value, expires_at, verified)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id
            "#,
        )
        .bind(otp.account_id.get())
        .bind(otp.code.as_str())
        .bind(otp.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(OtpId::from_raw(id))
    }

    async fn delete_for_account(&self, account_id: AccountId) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM otps WHERE account_id = $1")
            .bind(account_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn find_active(
        &self,
        account_id: AccountId,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<OtpRecord>> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, account_id, otp_value, expires_at, verified
            FROM otps
            WHERE account_id = $1
              AND otp_value = $2
              AND expires_at > $3
              AND verified = FALSE
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(account_id.get())
        .bind(code.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OtpRow::into_record))
    }

    async fn mark_verified(&self, id: OtpId) -> StoreResult<bool> {
        let flipped = sqlx::query("UPDATE otps SET verified = TRUE WHERE id = $1 AND verified = FALSE")
            .bind(id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(flipped == 1)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    password_changed: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_account(self) -> StoreResult<Account> {
        let password_hash = PasswordHash::from_db(self.password_hash).map_err(|e| {
            StoreError::Backend(format!("account {}: {}", self.id, e.message()))
        })?;

        Ok(Account {
            id: AccountId::from_raw(self.id),
            username: Username::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
            date_joined: self.date_joined,
            last_login: self.last_login,
            password_changed: self.password_changed,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: i64,
    account_id: i64,
    otp_value: String,
    expires_at: DateTime<Utc>,
    verified: bool,
}

impl OtpRow {
    fn into_record(self) -> OtpRecord {
        OtpRecord {
            id: OtpId::from_raw(self.id),
            account_id: AccountId::from_raw(self.account_id),
            code: OtpCode::from_db(self.otp_value),
            expires_at: self.expires_at,
            verified: self.verified,
        }
    }
}
