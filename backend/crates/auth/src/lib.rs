//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + password sign-up and login
//! - Find-or-create login for identities verified by an external provider
//! - Opaque bearer tokens with a fixed 30-day lifetime
//! - Public user profiles with marketplace aggregates
//!
//! ## Security Model
//! - Passwords hashed with salted PBKDF2-HMAC-SHA256; legacy unsalted
//!   digests still verify and are re-hashed on the next login
//! - Only the SHA-256 digest of a bearer token is stored
//! - Session checks are read-only; expiry is passive

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AuthMiddlewareState, CurrentUser, require_auth_session};
pub use presentation::router::{auth_router, users_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
