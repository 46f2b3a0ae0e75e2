//! Application Layer
//!
//! The authentication engine, its token codec and configuration. Engine
//! operations are grouped by concern, one `impl AuthEngine` block per file.

pub mod account;
pub mod config;
pub mod engine;
pub mod otp;
pub mod password;
pub mod register;
pub mod sign_in;
pub mod token;

// Re-exports
pub use account::ProfileChanges;
pub use config::{ConfigError, IdentityConfig};
pub use engine::AuthEngine;
pub use token::TokenCodec;
