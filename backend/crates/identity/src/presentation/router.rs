//! Identity Router

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sqlx::PgPool;

use crate::application::{config::IdentityConfig, engine::AuthEngine};
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::infra::postgres::PgCredentialStore;
use crate::presentation::handlers::{self, IdentityState};
use crate::presentation::middleware::{AccessGate, RoleGate, require_bearer, require_role};

/// Create the identity router backed by PostgreSQL.
/// Paths are relative; the binary nests them under `/api`.
pub fn identity_router(pool: PgPool, config: IdentityConfig) -> Router {
    let store = Arc::new(PgCredentialStore::new(pool));
    let engine = AuthEngine::new(Arc::clone(&store), store, Arc::new(config));
    identity_router_generic(engine)
}

/// Create the identity router for any credential store
pub fn identity_router_generic<A, O>(engine: AuthEngine<A, O>) -> Router
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let gate = AccessGate::new(Arc::clone(engine.tokens()));
    let state = IdentityState { engine };

    let public = Router::new()
        .route("/auth/user_register", post(handlers::user_register::<A, O>))
        .route("/auth/user_login", post(handlers::user_login::<A, O>));

    let authenticated = Router::new()
        .route("/auth/refresh_token", post(handlers::refresh_token::<A, O>))
        .route("/user/get_user_profile", get(handlers::get_user_profile::<A, O>))
        .route(
            "/user/update_user_profile",
            post(handlers::update_user_profile::<A, O>),
        )
        .route(
            "/user/change_user_password",
            post(handlers::change_user_password::<A, O>),
        )
        .route_layer(from_fn_with_state(gate.clone(), require_bearer));

    let admin = Router::new()
        .route("/auth/admin", get(handlers::admin_area))
        .route_layer(from_fn_with_state(RoleGate::admin(gate.clone()), require_role));

    let superuser = Router::new()
        .route("/auth/superuser", get(handlers::superuser_area))
        .route(
            "/admin/reset_user_password",
            post(handlers::reset_user_password::<A, O>),
        )
        .route_layer(from_fn_with_state(RoleGate::superuser(gate), require_role));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .merge(superuser)
        .with_state(state)
}
