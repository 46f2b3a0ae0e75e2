//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential store traits
//! - `application/` - Auth engine, token codec, configuration
//! - `infra/` - PostgreSQL and in-memory credential stores
//! - `presentation/` - HTTP handlers, DTOs, access gates, router
//!
//! ## Features
//! - Account registration with unique username and email
//! - Login by username or email, issuing HS256 bearer tokens
//! - Token refresh for still-valid tokens
//! - Password change and administrative reset
//! - Single-use numeric OTPs
//! - Bearer and role gates for downstream routes
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper, rehashed on login
//!   when parameters change
//! - Token verification accepts the HMAC family only
//! - Login failures do not reveal whether the account exists

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AuthEngine, ConfigError, IdentityConfig, ProfileChanges, TokenCodec};
pub use error::{IdentityError, IdentityResult, ValidationErrors};
pub use infra::{MemoryCredentialStore, PgCredentialStore};
pub use presentation::router::{identity_router, identity_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
