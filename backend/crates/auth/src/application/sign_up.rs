//! Sign Up Use Case
//!
//! Creates a user with an email/password credential and logs them in.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::create_session::{CreateSessionUseCase, IssuedSession};
use crate::domain::entity::{credential::Credential, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user: User,
    pub session: IssuedSession,
}

/// Sign up use case
pub struct SignUpUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignUpUseCase<U, S>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(input.email)?;
        let name = DisplayName::new(input.name)?;
        let role = UserRole::self_selectable(input.role.as_deref())?;
        let raw_password = RawPassword::new(input.password)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = UserPassword::from_raw(&raw_password)?;

        let user = User::new(email, name, role);
        let credential = Credential::new(user.id, password_hash);

        // Unique index on email is the backstop for concurrent sign-ups
        self.user_repo.create(&user, Some(&credential)).await?;

        let session = CreateSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .execute(user.id)
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");

        Ok(SignUpOutput { user, session })
    }
}
