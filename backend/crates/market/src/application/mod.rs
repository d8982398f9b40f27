//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod award_bounty;
pub mod browse;
pub mod cancel_bounty;
pub mod comments;
pub mod config;
pub mod create_bounty;
pub mod create_submission;
pub mod expire_overdue;
pub mod mark_live;
pub mod score_submission;
pub mod update_bounty;
pub mod update_submission;

pub use award_bounty::AwardBountyUseCase;
pub use browse::{BrowseUseCase, ListBountiesInput};
pub use cancel_bounty::CancelBountyUseCase;
pub use comments::{CommentUseCase, CreateCommentInput};
pub use config::MarketConfig;
pub use create_bounty::CreateBountyUseCase;
pub use create_submission::CreateSubmissionUseCase;
pub use expire_overdue::ExpireOverdueUseCase;
pub use mark_live::MarkLiveUseCase;
pub use score_submission::{ScoreSubmissionInput, ScoreSubmissionUseCase};
pub use update_bounty::UpdateBountyUseCase;
pub use update_submission::UpdateSubmissionUseCase;
