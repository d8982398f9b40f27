//! Market (Bounty Board) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, state machines, award settlement, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers
//!
//! ## Consistency Model
//! - Every multi-row write (submission + counter, award + user aggregates)
//!   runs in one transaction holding the bounty row lock
//! - Domain guards run on the locked row; a failed guard writes nothing
//! - Concurrent awards on one bounty produce exactly one winner

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::MarketConfig;
pub use application::expire_overdue::ExpireOverdueUseCase;
pub use error::{MarketError, MarketResult};
pub use infra::postgres::PgMarketRepository;
pub use presentation::router::market_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
