//! Create Session Use Case
//!
//! Issues a bearer token after any successful authentication event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::token::SessionToken;

use crate::application::config::AuthConfig;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthResult;

/// Token handed back to the client exactly once
#[derive(Debug)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

pub struct CreateSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CreateSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> AuthResult<IssuedSession> {
        let (token, session) =
            AuthSession::issue(user_id, self.config.session_ttl_chrono(), Utc::now());

        self.session_repo.create(&session).await?;

        tracing::debug!(user_id = %user_id, expires_at = %session.expires_at, "Session issued");

        Ok(IssuedSession {
            token,
            expires_at: session.expires_at,
        })
    }
}
