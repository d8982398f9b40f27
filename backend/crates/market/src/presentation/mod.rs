//! Presentation Layer - HTTP Handlers
//!
//! Axum handlers, DTOs, and router configuration.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::MarketAppState;
pub use router::market_router;
