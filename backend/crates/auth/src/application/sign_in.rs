//! Sign In Use Case
//!
//! Email + password login. Unknown email, missing credential and wrong
//! password all answer `InvalidCredentials`.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::create_session::{CreateSessionUseCase, IssuedSession};
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthSessionRepository, CredentialRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    pub session: IssuedSession,
}

/// Sign in use case
pub struct SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, C, S> SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        credential_repo: Arc<C>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credential_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;
        let attempt = RawPassword::attempt(input.password);

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Accounts created through an external provider have no password
        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !credential.password_hash.verify(&attempt) {
            return Err(AuthError::InvalidCredentials);
        }

        if credential.password_hash.needs_rehash() && self.config.upgrade_legacy_hashes {
            // Login already succeeded; a failed upgrade is retried next time
            match UserPassword::from_raw(&attempt) {
                Ok(upgraded) => {
                    credential.update_password(upgraded);
                    match self.credential_repo.update(&credential).await {
                        Ok(()) => {
                            tracing::info!(user_id = %user.id, "Upgraded legacy password hash")
                        }
                        Err(e) => {
                            tracing::warn!(user_id = %user.id, error = %e, "Legacy hash upgrade failed")
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(user_id = %user.id, error = %e, "Legacy hash upgrade failed")
                }
            }
        }

        let session = CreateSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .execute(user.id)
            .await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SignInOutput { user, session })
    }
}
