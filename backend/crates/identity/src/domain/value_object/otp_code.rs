//! One-time passcode value object

use kernel::error::app_error::{AppError, AppResult};
use platform::crypto::{constant_time_eq, random_digits};
use std::fmt;

/// Widest code the `otps.otp_value` column holds
pub const OTP_MAX_LENGTH: usize = 10;

/// Fixed-length decimal code
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Fresh random code of `len` digits (1..=[`OTP_MAX_LENGTH`])
    pub fn generate(len: usize) -> AppResult<Self> {
        if len == 0 || len > OTP_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "OTP length must be between 1 and {}",
                OTP_MAX_LENGTH
            )));
        }
        Ok(Self(random_digits(len)))
    }

    /// Parse caller input as-is. Any non-digit, whitespace included, is
    /// rejected.
    pub fn parse(raw: impl AsRef<str>) -> AppResult<Self> {
        let raw = raw.as_ref();
        if raw.is_empty() || raw.len() > OTP_MAX_LENGTH || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AppError::bad_request("OTP must be a numeric code"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constant-time equality
    pub fn matches(&self, other: &OtpCode) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OtpCode").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length() {
        assert_eq!(OtpCode::generate(6).unwrap().len(), 6);
        assert_eq!(OtpCode::generate(10).unwrap().len(), 10);
        assert!(OtpCode::generate(0).is_err());
        assert!(OtpCode::generate(11).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(OtpCode::parse("012345").unwrap().as_str(), "012345");
        assert!(OtpCode::parse(" 012345 ").is_err());
        assert!(OtpCode::parse("012345\n").is_err());
        assert!(OtpCode::parse("12a456").is_err());
        assert!(OtpCode::parse("").is_err());
        assert!(OtpCode::parse("12345678901").is_err());
    }

    #[test]
    fn test_matches() {
        let code = OtpCode::parse("123456").unwrap();
        assert!(code.matches(&OtpCode::from_db("123456")));
        assert!(!code.matches(&OtpCode::from_db("123457")));
        assert!(!code.matches(&OtpCode::from_db("12345")));
    }
}
