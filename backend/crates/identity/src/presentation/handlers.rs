//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRequest, State};
use axum::http::{HeaderMap, StatusCode};

use crate::application::engine::AuthEngine;
use crate::domain::repository::{AccountRepository, OtpRepository};
use crate::error::{IdentityError, IdentityResult};
use crate::presentation::dto::{
    AreaResponse, ChangePasswordRequest, LoginRequest, MessageResponse, ProfileResponse,
    RegisterRequest, RegisterResponse, ResetPasswordRequest, TokenResponse, UpdateProfileRequest,
};
use crate::presentation::middleware::{CurrentAccount, bearer_token};

/// JSON body whose rejection renders as an identity error
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(IdentityError))]
pub struct ValidJson<T>(pub T);

/// Shared state for identity handlers
pub struct IdentityState<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    pub engine: AuthEngine<A, O>,
}

impl<A, O> Clone for IdentityState<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

// ============================================================================
// Registration / Login
// ============================================================================

/// POST /api/auth/user_register
pub async fn user_register<A, O>(
    State(state): State<IdentityState<A, O>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> IdentityResult<(StatusCode, Json<RegisterResponse>)>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let (draft, password) = req.into_draft();
    let id = state.engine.register(draft, &password).await?;
    let account = state.engine.get_account(id).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(account))))
}

/// POST /api/auth/user_login
pub async fn user_login<A, O>(
    State(state): State<IdentityState<A, O>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> IdentityResult<Json<TokenResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let (_account, token) = state
        .engine
        .login(&req.username, &req.password)
        .await
        .map_err(IdentityError::conceal_credentials)?;

    Ok(Json(TokenResponse::from(token?)))
}

/// POST /api/auth/refresh_token
pub async fn refresh_token<A, O>(
    State(state): State<IdentityState<A, O>>,
    headers: HeaderMap,
) -> IdentityResult<Json<TokenResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let token = bearer_token(&headers)?;
    let refreshed = state.engine.tokens().refresh(token)?;

    Ok(Json(TokenResponse::from(refreshed)))
}

// ============================================================================
// Role-gated areas
// ============================================================================

/// GET /api/auth/admin
pub async fn admin_area(CurrentAccount(claims): CurrentAccount) -> Json<AreaResponse> {
    Json(AreaResponse {
        message: "Welcome to the admin area",
        user_id: claims.user_id,
        username: claims.username,
    })
}

/// GET /api/auth/superuser
pub async fn superuser_area(CurrentAccount(claims): CurrentAccount) -> Json<AreaResponse> {
    Json(AreaResponse {
        message: "Welcome to the superuser area",
        user_id: claims.user_id,
        username: claims.username,
    })
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/user/get_user_profile
pub async fn get_user_profile<A, O>(
    State(state): State<IdentityState<A, O>>,
    CurrentAccount(claims): CurrentAccount,
) -> IdentityResult<Json<ProfileResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let account = state.engine.get_account(claims.user_id).await?;
    Ok(Json(ProfileResponse::from(account)))
}

/// POST /api/user/update_user_profile
pub async fn update_user_profile<A, O>(
    State(state): State<IdentityState<A, O>>,
    CurrentAccount(claims): CurrentAccount,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> IdentityResult<Json<ProfileResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    let account = state
        .engine
        .update_profile(claims.user_id, req.into())
        .await?;
    Ok(Json(ProfileResponse::from(account)))
}

// ============================================================================
// Password
// ============================================================================

/// POST /api/user/change_user_password
pub async fn change_user_password<A, O>(
    State(state): State<IdentityState<A, O>>,
    CurrentAccount(claims): CurrentAccount,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(IdentityError::InvalidArgument(
            "Current and new passwords are required".to_string(),
        ));
    }

    state
        .engine
        .change_password(claims.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

/// POST /api/admin/reset_user_password
pub async fn reset_user_password<A, O>(
    State(state): State<IdentityState<A, O>>,
    CurrentAccount(claims): CurrentAccount,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> IdentityResult<Json<MessageResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    O: OtpRepository + Send + Sync + 'static,
{
    state
        .engine
        .reset_password(req.user_id, &req.new_password)
        .await?;

    tracing::info!(
        account_id = %req.user_id,
        by = %claims.user_id,
        "Password reset by superuser"
    );

    Ok(Json(MessageResponse {
        message: "Password reset successfully",
    }))
}
