//! External Sign In Use Case
//!
//! Second half of the OAuth flow. The provider exchange has already produced
//! a verified email; this finds or creates the matching user and issues a
//! session. External-only users get no credential.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::create_session::{CreateSessionUseCase, IssuedSession};
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{display_name::DisplayName, email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

pub struct ExternalSignInInput {
    pub provider: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct ExternalSignInOutput {
    pub user: User,
    pub session: IssuedSession,
    pub created: bool,
}

pub struct ExternalSignInUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> ExternalSignInUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: ExternalSignInInput) -> AuthResult<ExternalSignInOutput> {
        let email = Email::new(input.email)?;

        let (user, created) = match self.user_repo.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let name = match input.name.filter(|n| !n.trim().is_empty()) {
                    Some(name) => DisplayName::new(name)?,
                    None => DisplayName::from_email_local_part(email.as_str()),
                };
                let user = User::new(email.clone(), name, UserRole::default());

                match self.user_repo.create(&user, None).await {
                    Ok(()) => (user, true),
                    // Lost a race with a concurrent first login for the same email
                    Err(AuthError::EmailTaken) => {
                        let existing = self
                            .user_repo
                            .find_by_email(&email)
                            .await?
                            .ok_or(AuthError::UserNotFound)?;
                        (existing, false)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let session = CreateSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .execute(user.id)
            .await?;

        tracing::info!(
            user_id = %user.id,
            provider = %input.provider,
            created,
            "External sign in"
        );

        Ok(ExternalSignInOutput {
            user,
            session,
            created,
        })
    }
}
