//! Token Codec
//!
//! Signs and verifies HS256 session tokens (JWT).
//!
//! Every verification failure (bad signature, foreign algorithm, expiry,
//! malformed input) collapses into [`IdentityError::InvalidToken`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::application::config::IdentityConfig;
use crate::domain::entity::{
    account::Account,
    session::{IssuedToken, SessionClaims},
};
use crate::error::{IdentityError, IdentityResult};

/// Session token signer / verifier
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &IdentityConfig) -> Self {
        // Accept the HMAC family only; RSA/EC/none headers are rejected
        // before any signature work.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.signing_secret()),
            decoding: DecodingKey::from_secret(config.signing_secret()),
            validation,
            ttl: config.token_ttl_chrono(),
        }
    }

    /// Sign a token for `account`, valid from now for the configured TTL
    pub fn issue(&self, account: &Account) -> IdentityResult<IssuedToken> {
        self.issue_at(account, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        account: &Account,
        issued_at: DateTime<Utc>,
    ) -> IdentityResult<IssuedToken> {
        let expires_at = self.expiry_from(issued_at)?;
        let claims = SessionClaims::for_account(account, issued_at, expires_at);
        self.sign(claims)
    }

    /// Verified claims, or `InvalidToken`
    pub fn verify(&self, token: &str) -> IdentityResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                IdentityError::InvalidToken
            })
    }

    /// Re-sign the identity of a currently valid token with a fresh window.
    ///
    /// The new expiry is always strictly later than the presented one.
    pub fn refresh(&self, token: &str) -> IdentityResult<IssuedToken> {
        let previous = self.verify(token)?;

        let now = Utc::now();
        let exp = self.expiry_from(now)?.timestamp().max(previous.exp + 1);

        self.sign(SessionClaims {
            iat: now.timestamp(),
            exp,
            ..previous
        })
    }

    fn expiry_from(&self, issued_at: DateTime<Utc>) -> IdentityResult<DateTime<Utc>> {
        issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| IdentityError::Token("token expiry out of range".to_string()))
    }

        fn sign(&self, claims: SessionClaims) -> IdentityResult<IssuedToken> {
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| IdentityError::Token(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email,
        ids::AccountId,
        password::{PasswordHash, RawPassword},
        username::Username,
    };
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn account(superuser: bool) -> Account {
        let raw = RawPassword::new("Secret1!").unwrap();
        Account {
            id: AccountId::from_raw(1),
            username: Username::new("a@x.com").unwrap(),
            email: Email::new("a@x.com").unwrap(),
            password_hash: PasswordHash::from_raw(&raw, None).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: superuser,
            date_joined: Utc::now(),
            last_login: None,
            password_changed: None,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&IdentityConfig::with_random_secret())
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = codec();
        let acc = account(true);
        let issued = codec.issue(&acc).unwrap();
        let claims = codec.verify(&issued.token).unwrap();

        assert_eq!(claims.user_id, acc.id);
        assert_eq!(claims.username, "a@x.com");
        assert!(claims.is_superuser);
        assert!(claims.iat <= claims.exp);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let issued = codec
            .issue_at(&account(false), Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(matches!(
            codec.verify(&issued.token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issued = codec().issue(&account(false)).unwrap();
        assert!(matches!(
            codec().verify(&issued.token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let issued = codec.issue(&account(false)).unwrap();
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();

        let mut claims = issued.claims.clone();
        claims.is_superuser = true;
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        assert!(matches!(
            codec.verify(&parts.join(".")),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let codec = codec();
        let issued = codec.issue(&account(false)).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();

        for alg in ["RS256", "ES256", "none"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
            let forged = format!("{}.{}.{}", header, parts[1], parts[2]);
            assert!(
                matches!(codec.verify(&forged), Err(IdentityError::InvalidToken)),
                "{} header must be rejected",
                alg
            );
        }
    }

    #[test]
    fn test_unrepresentable_expiry_is_token_error() {
        let mut config = IdentityConfig::with_random_secret();
        // set directly, bypassing the builder bound
        config.token_ttl = std::time::Duration::from_secs(3_000_000_000_000_000);
        let codec = TokenCodec::new(&config);

        assert!(matches!(
            codec.issue(&account(false)),
            Err(IdentityError::Token(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec();
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(matches!(codec.verify(token), Err(IdentityError::InvalidToken)));
        }
    }

    #[test]
    fn test_refresh_extends_expiry() {
        let codec = codec();
        let acc = account(false);
        let original = codec.issue(&acc).unwrap();
        let refreshed = codec.refresh(&original.token).unwrap();
        let claims = codec.verify(&refreshed.token).unwrap();

        assert_eq!(claims.user_id, original.claims.user_id);
        assert_eq!(claims.username, original.claims.username);
        assert_eq!(claims.is_superuser, original.claims.is_superuser);
        assert!(claims.exp > original.claims.exp);
    }

    #[test]
    fn test_refresh_requires_valid_token() {
        let codec = codec();
        let expired = codec
            .issue_at(&account(false), Utc::now() - Duration::hours(48))
            .unwrap();

        assert!(matches!(
            codec.refresh(&expired.token),
            Err(IdentityError::InvalidToken)
        ));
    }
}
