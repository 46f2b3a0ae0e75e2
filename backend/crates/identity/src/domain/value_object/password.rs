//! Password Value Objects
//!
//! Domain wrappers over `platform::password`:
//! - [`RawPassword`]: validated clear text, zeroized on drop
//! - [`PasswordHash`]: Argon2id PHC string, the only form ever stored
//!
//! Neither type implements `Serialize`; a hash never leaves the service.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

/// Clear text password from a request body
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw.into()).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => AppError::bad_request("Password is required"),
            PasswordPolicyError::TooLong { max, .. } => {
                AppError::bad_request(format!("Password must be at most {} characters", max))
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Stored password hash
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(HashedPassword);

impl PasswordHash {
    /// Hash with a fresh salt
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))
    }

    /// Rebuild from the PHC column
    pub fn from_db(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let raw = RawPassword::new("Secret1!").unwrap();
        let hash = PasswordHash::from_raw(&raw, None).unwrap();

        assert!(hash.verify(&raw, None));
        assert!(!hash.verify(&RawPassword::new("secret1!").unwrap(), None));
    }

    #[test]
    fn test_db_roundtrip() {
        let raw = RawPassword::new("Secret1!").unwrap();
        let hash = PasswordHash::from_raw(&raw, Some(b"pep")).unwrap();
        let restored = PasswordHash::from_db(hash.as_phc_string()).unwrap();

        assert!(restored.verify(&raw, Some(b"pep")));
        assert!(PasswordHash::from_db("plaintext").is_err());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(RawPassword::new("").unwrap_err().message(), "Password is required");
        assert!(RawPassword::new("x".repeat(200)).is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("Secret1!").unwrap();
        assert!(!format!("{:?}", raw).contains("Secret"));
        let hash = PasswordHash::from_raw(&raw, None).unwrap();
        assert!(!format!("{:?}", hash).contains("argon2"));
    }
}
