//! Profile Use Case

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// The authenticated caller's own profile
    pub async fn me(&self, user_id: UserId) -> AuthResult<User> {
        self.public_profile(user_id).await
    }

    /// Any user's profile; the presentation layer strips private fields
    pub async fn public_profile(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
