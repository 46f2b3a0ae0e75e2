//! Access Gates
//!
//! Middleware for bearer-token authentication and role checks. A passing
//! gate attaches the verified claims to the request extensions as
//! [`CurrentAccount`]; downstream handlers extract them from there.
//!
//! ```text
//! Authorization: Bearer <token>
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::token::TokenCodec;
use crate::domain::entity::session::SessionClaims;
use crate::error::{IdentityError, IdentityResult};

/// Claims of the authenticated caller, as attached by a gate
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub SessionClaims);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAccount>()
            .cloned()
            .ok_or(IdentityError::Unauthenticated)
    }
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// The header must split on single spaces into exactly `Bearer` and a
/// non-empty token.
pub fn bearer_token(headers: &HeaderMap) -> IdentityResult<&str> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(IdentityError::MissingCredential);
    };
    if value.is_empty() {
        return Err(IdentityError::MissingCredential);
    }

    let value = value
        .to_str()
        .map_err(|_| IdentityError::MalformedCredential)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(IdentityError::MalformedCredential),
    }
}

/// Base gate: a valid bearer token is required
#[derive(Clone)]
pub struct AccessGate {
    codec: Arc<TokenCodec>,
}

impl AccessGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Parse and verify the request credential
    pub fn authenticate(&self, headers: &HeaderMap) -> IdentityResult<SessionClaims> {
        let token = bearer_token(headers)?;
        self.codec.verify(token)
    }
}

/// Predicate over verified claims
pub type RoleRule = Arc<dyn Fn(&SessionClaims) -> bool + Send + Sync>;

/// Base gate followed by a claims predicate. A failing predicate is 403.
#[derive(Clone)]
pub struct RoleGate {
    gate: AccessGate,
    rule: RoleRule,
    message: Cow<'static, str>,
}

impl RoleGate {
    /// Gate on an arbitrary predicate, rejecting with `message`
    pub fn new<F>(gate: AccessGate, rule: F, message: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(&SessionClaims) -> bool + Send + Sync + 'static,
    {
        Self {
            gate,
            rule: Arc::new(rule),
            message: message.into(),
        }
    }

    /// Admin area. Claims carry no staff flag, so this is the superuser
    /// flag under its own message.
    pub fn admin(gate: AccessGate) -> Self {
        Self::new(gate, |claims| claims.is_superuser, "Admin access required")
    }

    pub fn superuser(gate: AccessGate) -> Self {
        Self::new(gate, |claims| claims.is_superuser, "Superuser access required")
    }

    /// Authenticate, then apply the predicate
    pub fn authorize(&self, headers: &HeaderMap) -> IdentityResult<SessionClaims> {
        let claims = self.gate.authenticate(headers)?;
        if (self.rule)(&claims) {
            Ok(claims)
        } else {
            Err(IdentityError::Forbidden(self.message.clone()))
        }
    }
}

impl fmt::Debug for RoleGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleGate")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Middleware that requires a valid bearer token
pub async fn require_bearer(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, IdentityError> {
    let claims = gate.authenticate(request.headers())?;
    request.extensions_mut().insert(CurrentAccount(claims));
    Ok(next.run(request).await)
}

/// Middleware that requires a valid bearer token whose claims pass the
/// gate's predicate
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, IdentityError> {
    let claims = gate.authorize(request.headers())?;
    request.extensions_mut().insert(CurrentAccount(claims));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");

        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(IdentityError::MissingCredential)
        ));
        assert!(matches!(
            bearer_token(&headers("")),
            Err(IdentityError::MissingCredential)
        ));

        for bad in ["Basic abc", "Bearer", "Bearer ", "bearer abc", "Bearer a b", "Bearer  abc"] {
            assert!(
                matches!(bearer_token(&headers(bad)), Err(IdentityError::MalformedCredential)),
                "{:?} must be malformed",
                bad
            );
        }
    }
}
