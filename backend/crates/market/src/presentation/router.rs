//! Market Router

use std::sync::Arc;

use auth::domain::repository::AuthSessionRepository;
use auth::{AuthMiddlewareState, require_auth_session};
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::application::config::MarketConfig;
use crate::domain::repository::MarketStore;
use crate::presentation::handlers::{self, MarketAppState};

/// Routes mounted under `/api`. Reads are public; writes and `/me/*`
/// require a bearer session checked against `sessions`.
pub fn market_router<R, S>(repo: Arc<R>, sessions: Arc<S>, config: MarketConfig) -> Router
where
    R: MarketStore,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    let guard = AuthMiddlewareState::new(sessions);
    let state = MarketAppState {
        repo,
        config: Arc::new(config),
    };

    let public = Router::new()
        .route("/bounties", get(handlers::list_bounties::<R>))
        .route("/bounties/{id}", get(handlers::get_bounty::<R>))
        .route(
            "/bounties/{id}/submissions",
            get(handlers::list_submissions::<R>),
        )
        .route("/bounties/{id}/comments", get(handlers::list_comments::<R>))
        .route("/submissions/{id}", get(handlers::get_submission::<R>));

    let protected = Router::new()
        .route("/bounties", post(handlers::create_bounty::<R>))
        .route("/bounties/{id}", patch(handlers::update_bounty::<R>))
        .route("/bounties/{id}/cancel", post(handlers::cancel_bounty::<R>))
        .route("/bounties/{id}/award", post(handlers::award_bounty::<R>))
        .route(
            "/bounties/{id}/submissions",
            post(handlers::create_submission::<R>),
        )
        .route(
            "/bounties/{id}/comments",
            post(handlers::create_comment::<R>),
        )
        .route("/submissions/{id}", patch(handlers::update_submission::<R>))
        .route(
            "/submissions/{id}/score",
            post(handlers::score_submission::<R>),
        )
        .route("/submissions/{id}/live", post(handlers::mark_live::<R>))
        .route("/comments/{id}", delete(handlers::delete_comment::<R>))
        .route("/me/bounties", get(handlers::my_bounties::<R>))
        .route("/me/submissions", get(handlers::my_submissions::<R>))
        .route_layer(middleware::from_fn_with_state(
            guard,
            require_auth_session::<S>,
        ));

    public.merge(protected).with_state(state)
}
