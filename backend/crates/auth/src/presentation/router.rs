//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth_session};

/// Routes mounted under `/api/auth`
pub fn auth_router<R>(repo: Arc<R>, config: AuthConfig) -> Router
where
    R: AuthStore,
{
    let guard = AuthMiddlewareState::new(repo.clone());
    let state = AuthAppState {
        repo,
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me::<R>))
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_auth_session::<R>,
        ));

    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/oauth", post(handlers::oauth::<R>))
        .route("/logout", post(handlers::logout))
        .merge(protected)
        .with_state(state)
}

/// Routes mounted under `/api/users`
pub fn users_router<R>(repo: Arc<R>, config: AuthConfig) -> Router
where
    R: AuthStore,
{
    let state = AuthAppState {
        repo,
        config: Arc::new(config),
    };

    Router::new()
        .route("/{id}", get(handlers::public_profile::<R>))
        .with_state(state)
}
