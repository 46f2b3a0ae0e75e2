//! Username Value Object
//!
//! Public login handle. Registration falls back to the email address when
//! no username is supplied, so `@`, `.` and `+` are all legal here.
//!
//! ## Invariants
//! - 3 to 50 characters after trimming
//! - no control characters

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let value = raw.as_ref().trim();
        let len = value.chars().count();

        if len == 0 {
            return Err(AppError::bad_request("Username is required"));
        }

        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
            return Err(AppError::bad_request(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            )));
        }

        if value.chars().any(char::is_control) {
            return Err(AppError::bad_request("Username contains invalid characters"));
        }

        Ok(Self(value.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(Username::new("ab").is_err());
        assert!(Username::new("abc").is_ok());
        assert!(Username::new("a".repeat(50)).is_ok());
        assert!(Username::new("a".repeat(51)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 3 characters, 9 bytes
        assert!(Username::new("日本語").is_ok());
        assert!(Username::new("é".repeat(50)).is_ok());
    }

    #[test]
    fn test_email_shaped_username() {
        let name = Username::new("a@x.com").unwrap();
        assert_eq!(name.as_str(), "a@x.com");
    }

    #[test]
    fn test_trim_and_control_chars() {
        assert_eq!(Username::new("  alice ").unwrap().as_str(), "alice");
        assert!(Username::new("ali\u{7}ce").is_err());
        assert_eq!(Username::new("").unwrap_err().message(), "Username is required");
    }
}
