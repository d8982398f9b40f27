//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::application::IssuedSession;
use crate::domain::entity::user::User;

// ============================================================================
// Sign Up / Login / OAuth
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verified identity from a completed provider token exchange
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    pub provider: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Returned by signup, login and oauth
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl SessionResponse {
    pub fn new(session: &IssuedSession, user: &User) -> Self {
        Self {
            token: session.token.as_str().to_string(),
            expires_at: session.expires_at,
            user: UserResponse::from(user),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// The caller's own profile (includes email)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub reputation: i64,
    pub total_earned: i64,
    pub total_posted: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            name: user.name.to_string(),
            role: user.role.code().to_string(),
            reputation: user.reputation,
            total_earned: user.total_earned,
            total_posted: user.total_posted,
            created_at: user.created_at,
        }
    }
}

/// Someone else's profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: UserId,
    pub name: String,
    pub role: String,
    pub reputation: i64,
    pub total_earned: i64,
    pub total_posted: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            role: user.role.code().to_string(),
            reputation: user.reputation,
            total_earned: user.total_earned,
            total_posted: user.total_posted,
            created_at: user.created_at,
        }
    }
}
