//! Application Configuration
//!
//! Process-wide settings for the identity service. Built once at startup
//! and shared read-only (`Arc<IdentityConfig>`) by the engine and the
//! token codec.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default session token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);
/// Default OTP length in digits
pub const DEFAULT_OTP_LENGTH: usize = 6;
/// Default OTP validity (15 minutes)
pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(15 * 60);
/// Longest accepted session token lifetime (366 days)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(366 * 24 * 3600);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("token signing secret is missing or empty")]
    MissingSigningSecret,

    #[error("token lifetime must be between 1 second and 366 days")]
    InvalidTokenTtl,
}

/// Identity service configuration
#[derive(Clone)]
pub struct IdentityConfig {
    /// HMAC key for session tokens
    signing_secret: Vec<u8>,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// Default OTP length
    pub otp_length: usize,
    /// Default OTP validity
    pub otp_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl IdentityConfig {
    /// Config with the given signing secret and default lifetimes
    pub fn new(signing_secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let signing_secret = signing_secret.into();
        if signing_secret.is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }

        Ok(Self {
            signing_secret,
            token_ttl: DEFAULT_TOKEN_TTL,
            otp_length: DEFAULT_OTP_LENGTH,
            otp_ttl: DEFAULT_OTP_TTL,
            password_pepper: None,
        })
    }

    /// Create config with a random signing secret (for tests and development)
    pub fn with_random_secret() -> Self {
        Self {
            signing_secret: platform::crypto::random_bytes(32),
            token_ttl: DEFAULT_TOKEN_TTL,
            otp_length: DEFAULT_OTP_LENGTH,
            otp_ttl: DEFAULT_OTP_TTL,
            password_pepper: None,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::InvalidTokenTtl);
        }
        self.token_ttl = ttl;
        Ok(self)
    }

    pub fn with_pepper(mut self, pepper: impl Into<Vec<u8>>) -> Self {
        let pepper = pepper.into();
        self.password_pepper = (!pepper.is_empty()).then_some(pepper);
        self
    }

    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Token lifetime as a chrono duration
    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl).unwrap_or(chrono::Duration::hours(24))
    }

    /// OTP validity as a chrono duration
    pub fn otp_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.otp_ttl).unwrap_or(chrono::Duration::minutes(15))
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("otp_length", &self.otp_length)
            .field("otp_ttl", &self.otp_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(
            IdentityConfig::new(Vec::new()).unwrap_err(),
            ConfigError::MissingSigningSecret
        );
        assert!(IdentityConfig::new("s3cret").is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = IdentityConfig::new("s3cret").unwrap();
        assert_eq!(config.token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.otp_length, 6);
        assert_eq!(config.otp_ttl, Duration::from_secs(900));
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = IdentityConfig::with_random_secret();
        assert_eq!(
            config.with_token_ttl(Duration::ZERO).unwrap_err(),
            ConfigError::InvalidTokenTtl
        );
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let config = IdentityConfig::with_random_secret();
        assert_eq!(
            config
                .clone()
                .with_token_ttl(MAX_TOKEN_TTL + Duration::from_secs(1))
                .unwrap_err(),
            ConfigError::InvalidTokenTtl
        );
        assert_eq!(
            config.clone().with_token_ttl(Duration::MAX).unwrap_err(),
            ConfigError::InvalidTokenTtl
        );
        assert!(config.with_token_ttl(MAX_TOKEN_TTL).is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = IdentityConfig::new("topsecret").unwrap().with_pepper("pep");
        let debug = format!("{:?}", config);
        assert!(debug.contains("signing_secret: \"[REDACTED]\""));
        assert!(debug.contains("password_pepper: Some(\"[REDACTED]\")"));
    }
}
