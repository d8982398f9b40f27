//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;
use kernel::error::app_error::AppError;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::{
    ExternalSignInInput, ExternalSignInUseCase, ProfileUseCase, SignInInput, SignInUseCase,
    SignUpInput, SignUpUseCase,
};
use crate::domain::repository::AuthStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginRequest, OAuthRequest, PublicUserResponse, SessionResponse, SignUpRequest, UserResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    WithRejection(Json(req), _): WithRejection<Json<SignUpRequest>, AppError>,
) -> AuthResult<(StatusCode, Json<SessionResponse>)>
where
    R: AuthStore,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            name: req.name,
            role: req.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(&output.session, &output.user)),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AuthResult<Json<SessionResponse>>
where
    R: AuthStore,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SessionResponse::new(&output.session, &output.user)))
}

/// POST /api/auth/oauth
pub async fn oauth<R>(
    State(state): State<AuthAppState<R>>,
    WithRejection(Json(req), _): WithRejection<Json<OAuthRequest>, AppError>,
) -> AuthResult<Json<SessionResponse>>
where
    R: AuthStore,
{
    let use_case =
        ExternalSignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(ExternalSignInInput {
            provider: req.provider,
            email: req.email,
            name: req.name,
        })
        .await?;

    Ok(Json(SessionResponse::new(&output.session, &output.user)))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Sessions are not revoked server-side; the client discards its token.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ============================================================================
// Profiles
// ============================================================================

/// GET /api/auth/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentUser,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
{
    let user = ProfileUseCase::new(state.repo.clone()).me(current.id()).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// GET /api/users/{id}
pub async fn public_profile<R>(
    State(state): State<AuthAppState<R>>,
    WithRejection(Path(user_id), _): WithRejection<Path<UserId>, AppError>,
) -> AuthResult<Json<PublicUserResponse>>
where
    R: AuthStore,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .public_profile(user_id)
        .await?;
    Ok(Json(PublicUserResponse::from(&user)))
}
