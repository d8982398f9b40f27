//! Auth Middleware
//!
//! Bearer-token authentication for protected routes. Other crates layer
//! [`require_auth_session`] onto their own routers and read the caller
//! through the [`CurrentUser`] extractor.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use kernel::id::UserId;

use crate::application::CheckSessionUseCase;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub repo: Arc<S>,
}

// Manual impl: only the `Arc` is cloned, `S` itself need not be `Clone`
impl<S> Clone for AuthMiddlewareState<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<S> AuthMiddlewareState<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }
}

/// Authenticated caller, inserted into request extensions by the middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0
    }
}

impl<St> FromRequestParts<St> for CurrentUser
where
    St: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(AuthError::MissingToken)
    }
}

/// Reads `Authorization: Bearer <token>`
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Result<String, AuthError> {
    match headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => Ok(bearer.token().to_string()),
        None if headers.contains_key(header::AUTHORIZATION) => Err(AuthError::SessionInvalid),
        None => Err(AuthError::MissingToken),
    }
}

/// Middleware that requires a valid auth session
pub async fn require_auth_session<S>(
    State(state): State<AuthMiddlewareState<S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    let token = match bearer_token(req.headers()) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let user_id = match CheckSessionUseCase::new(state.repo.clone())
        .authenticate(&token)
        .await
    {
        Ok(user_id) => user_id,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(CurrentUser(user_id));

    next.run(req).await
}
