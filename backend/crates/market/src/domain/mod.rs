//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Bounty, Submission, Comment) and their patches
//! - Domain value objects (statuses, Budget, Score, WebUrl)
//! - Domain services (award settlement)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use entities::{
    Bounty, BountyLimits, BountyPatch, BountyPatchInput, Comment, NewBounty, NewSubmission,
    Submission, SubmissionPatch, SubmissionPatchInput,
};
pub use repository::{
    AwardOutcome, AwardRepository, BountyFilter, BountyRepository, CommentRepository,
    MarketStore, Page, Paged, SubmissionRepository,
};
pub use services::AwardSettlement;
