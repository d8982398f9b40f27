//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and, for email sign-up, its credential in one unit.
    /// A duplicate email fails with `AuthError::EmailTaken`.
    async fn create(&self, user: &User, credential: Option<&Credential>) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;
}

/// Credential repository trait
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>>;

    async fn update(&self, credential: &Credential) -> AuthResult<()>;
}

/// Auth session repository trait
///
/// Read-only after creation: no touch, no delete.
#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Look up by token digest, expired rows included
    async fn find_by_id(&self, session_id: &str) -> AuthResult<Option<AuthSession>>;
}

/// Everything the auth HTTP surface needs from one backing store
pub trait AuthStore:
    UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static
{
}
