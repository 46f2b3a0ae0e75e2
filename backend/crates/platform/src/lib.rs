//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id) with zeroized clear text
//! - Secure random material: bytes and numeric one-time codes
//! - Constant-time comparison

pub mod crypto;
pub mod password;
