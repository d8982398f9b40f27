//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the `auth` and `market` crates:
//! - Typed entity IDs (users, bounties, submissions, comments)
//! - The error classification used at the HTTP boundary
//! - Conversions from storage errors and HTTP extractor rejections
//!
//! Only things with the same meaning in every bounded context live here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
