//! Check Session Use Case
//!
//! Read-only: a lookup never writes, slides or deletes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::token::SessionToken;

use crate::domain::entity::auth_session::SessionLookup;
use crate::domain::repository::AuthSessionRepository;
use crate::error::{AuthError, AuthResult};

pub struct CheckSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> CheckSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn validate(&self, token: &str) -> AuthResult<SessionLookup> {
        self.validate_at(token, Utc::now()).await
    }

    /// Validate against an explicit clock reading
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionLookup> {
        if token.is_empty() {
            return Ok(SessionLookup::NotFound);
        }

        let session_id = SessionToken::from_presented(token).digest();

        let lookup = match self.session_repo.find_by_id(&session_id).await? {
            Some(session) => session.lookup_at(now),
            None => SessionLookup::NotFound,
        };

        Ok(lookup)
    }

    /// Resolve the caller, collapsing expired and unknown tokens into one error
    pub async fn authenticate(&self, token: &str) -> AuthResult<UserId> {
        self.validate(token)
            .await?
            .user_id()
            .ok_or(AuthError::SessionInvalid)
    }
}
