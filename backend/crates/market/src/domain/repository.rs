//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//!
//! Methods taking a `change` closure load the row under a lock, run the
//! closure on it and persist the result atomically. An `Err` from the
//! closure aborts without writing anything.

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, CommentId, SubmissionId, UserId};

use crate::domain::entities::{Bounty, Comment, Submission};
use crate::domain::services::AwardSettlement;
use crate::domain::value_objects::{BountyStatus, Category, Difficulty};
use crate::error::MarketResult;

/// Browse filters. Private bounties are excluded unless `include_private`.
#[derive(Debug, Clone, Default)]
pub struct BountyFilter {
    pub status: Option<BountyStatus>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub poster_id: Option<UserId>,
    /// Case-insensitive substring match on title and brief
    pub search: Option<String>,
    pub include_private: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: Page,
}

/// Bounty repository trait
#[trait_variant::make(BountyRepository: Send)]
pub trait LocalBountyRepository {
    async fn create_bounty(&self, bounty: &Bounty) -> MarketResult<()>;

    async fn find_bounty(&self, id: BountyId) -> MarketResult<Option<Bounty>>;

    /// Newest first
    async fn list_bounties(&self, filter: &BountyFilter, page: Page)
    -> MarketResult<Paged<Bounty>>;

    /// Locked read-modify-write; `BountyNotFound` when missing
    async fn update_bounty<F>(&self, id: BountyId, change: F) -> MarketResult<Bounty>
    where
        F: FnOnce(&mut Bounty) -> MarketResult<()> + Send;

    /// Move running bounties past their deadline to `expired`
    async fn expire_overdue(&self, now: DateTime<Utc>) -> MarketResult<u64>;
}

/// Submission repository trait
#[trait_variant::make(SubmissionRepository: Send)]
pub trait LocalSubmissionRepository {
    /// Insert the submission and bump the bounty counter in one transaction.
    /// The bounty is locked and must pass `Bounty::accept_submission`.
    async fn create_submission(&self, submission: &Submission) -> MarketResult<Bounty>;

    async fn find_submission(&self, id: SubmissionId) -> MarketResult<Option<Submission>>;

    /// Oldest first
    async fn list_submissions_for_bounty(&self, bounty_id: BountyId)
    -> MarketResult<Vec<Submission>>;

    /// Newest first
    async fn list_submissions_by_builder(&self, builder_id: UserId)
    -> MarketResult<Vec<Submission>>;

    /// Locked read-modify-write; the closure also sees the parent bounty
    async fn update_submission<F>(&self, id: SubmissionId, change: F) -> MarketResult<Submission>
    where
        F: FnOnce(&mut Submission, &Bounty) -> MarketResult<()> + Send;
}

/// Result of a committed award
#[derive(Debug, Clone)]
pub struct AwardOutcome {
    pub bounty: Bounty,
    pub submission: Submission,
    pub settlement: AwardSettlement,
}

/// Award repository trait
#[trait_variant::make(AwardRepository: Send)]
pub trait LocalAwardRepository {
    /// Run `settle_award` on the locked bounty and submission, then persist
    /// both rows and the user aggregates. All or nothing.
    async fn award(
        &self,
        bounty_id: BountyId,
        submission_id: SubmissionId,
        caller: UserId,
        reputation_bonus: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<AwardOutcome>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> MarketResult<()>;

    async fn find_comment(&self, id: CommentId) -> MarketResult<Option<Comment>>;

    /// Oldest first
    async fn list_comments(&self, bounty_id: BountyId) -> MarketResult<Vec<Comment>>;

    /// Returns false if no row was deleted
    async fn delete_comment(&self, id: CommentId, author_id: UserId) -> MarketResult<bool>;
}

/// Everything the HTTP layer needs from one store
pub trait MarketStore:
    BountyRepository
    + SubmissionRepository
    + AwardRepository
    + CommentRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> MarketStore for T where
    T: BountyRepository
        + SubmissionRepository
        + AwardRepository
        + CommentRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
