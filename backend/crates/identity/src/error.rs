//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::borrow::Cow;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::repository::{StoreError, UniqueField};

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Generic text for every 5xx response
const INTERNAL_MESSAGE: &str = "Internal server error";

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

/// All rejected fields of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            reason: reason.into(),
        });
    }

    /// Keep the value or record its error under `field`
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, AppError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.message());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|v| v.field)
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// `Err(Validation)` if anything was recorded
    pub fn into_result(self) -> IdentityResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.reason)?;
        }
        Ok(())
    }
}

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    InvalidArgument(String),

    /// Body was not the JSON the handler expects
    #[error("Invalid request body")]
    MalformedBody(String),

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already taken")]
    UsernameExists,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    /// Login failure as seen over HTTP; hides which half was wrong
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authorization header is required")]
    MissingCredential,

    #[error("Authorization header format must be Bearer <token>")]
    MalformedCredential,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Handler reached without claims in the request extensions
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(Cow<'static, str>),

    /// Token signing failed
    #[error("Token error: {0}")]
    Token(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Validation(_)
            | IdentityError::InvalidArgument(_)
            | IdentityError::MalformedBody(_)
            | IdentityError::EmailExists
            | IdentityError::UsernameExists => ErrorKind::BadRequest,
            IdentityError::AccountNotFound => ErrorKind::NotFound,
            IdentityError::InvalidPassword
            | IdentityError::InvalidCredentials
            | IdentityError::MissingCredential
            | IdentityError::MalformedCredential
            | IdentityError::InvalidToken
            | IdentityError::Unauthenticated => ErrorKind::Unauthorized,
            IdentityError::Forbidden(_) => ErrorKind::Forbidden,
            IdentityError::Token(_) | IdentityError::Storage(_) | IdentityError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side details stay out of the message.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, INTERNAL_MESSAGE)
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Collapse "no such account" and "wrong password" into one answer
    pub fn conceal_credentials(self) -> Self {
        match self {
            IdentityError::AccountNotFound | IdentityError::InvalidPassword => {
                IdentityError::InvalidCredentials
            }
            other => other,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Storage(msg) => {
                tracing::error!(error = %msg, "Identity storage error");
            }
            IdentityError::Token(msg) => {
                tracing::error!(error = %msg, "Token signing error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(error = %msg, "Identity internal error");
            }
            IdentityError::InvalidCredentials | IdentityError::InvalidPassword => {
                tracing::warn!("Failed authentication attempt");
            }
            IdentityError::Forbidden(msg) => {
                tracing::warn!(reason = %msg, "Access denied");
            }
            IdentityError::MalformedBody(detail) => {
                tracing::debug!(detail = %detail, "Rejected request body");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Email) => IdentityError::EmailExists,
            StoreError::UniqueViolation(UniqueField::Username) => IdentityError::UsernameExists,
            StoreError::NotFound => IdentityError::AccountNotFound,
            StoreError::Backend(msg) => IdentityError::Storage(msg),
        }
    }
}

impl From<JsonRejection> for IdentityError {
    fn from(rejection: JsonRejection) -> Self {
        IdentityError::MalformedBody(rejection.body_text())
    }
}
