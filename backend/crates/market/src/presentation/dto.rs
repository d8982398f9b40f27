//! API DTOs (Data Transfer Objects)
//!
//! Request bodies default every field so a missing value surfaces as a
//! validation error from the domain. A value of the wrong type fails
//! deserialization and is rejected by the extractor with a 400.

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, CommentId, SubmissionId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::{CreateCommentInput, ListBountiesInput, ScoreSubmissionInput};
use crate::domain::entities::{
    Bounty, BountyPatchInput, Comment, NewBounty, NewSubmission, Submission, SubmissionPatchInput,
};
use crate::domain::repository::{AwardOutcome, Paged};
use crate::domain::value_objects::{
    BountyStatus, Category, Difficulty, SubmissionStatus, Visibility,
};
use crate::error::MarketResult;

// ============================================================================
// Bounties
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBountyRequest {
    pub title: Option<String>,
    pub brief: Option<String>,
    pub detailed_spec: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub max_submissions: Option<i64>,
    pub visibility: Option<String>,
}

impl From<CreateBountyRequest> for NewBounty {
    fn from(req: CreateBountyRequest) -> Self {
        Self {
            title: req.title.unwrap_or_default(),
            brief: req.brief.unwrap_or_default(),
            detailed_spec: req.detailed_spec,
            budget_min: req.budget_min,
            budget_max: req.budget_max,
            deadline: req.deadline,
            category: req.category,
            difficulty: req.difficulty,
            tags: req.tags.unwrap_or_default(),
            tech_stack: req.tech_stack.unwrap_or_default(),
            max_submissions: req.max_submissions,
            visibility: req.visibility,
        }
    }
}

/// Unknown keys are ignored; only these fields can change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateBountyRequest {
    pub title: Option<String>,
    pub brief: Option<String>,
    pub detailed_spec: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub max_submissions: Option<i64>,
    pub visibility: Option<String>,
    pub status: Option<String>,
}

impl From<UpdateBountyRequest> for BountyPatchInput {
    fn from(req: UpdateBountyRequest) -> Self {
        Self {
            title: req.title,
            brief: req.brief,
            detailed_spec: req.detailed_spec,
            budget_min: req.budget_min,
            budget_max: req.budget_max,
            deadline: req.deadline,
            category: req.category,
            difficulty: req.difficulty,
            tags: req.tags,
            tech_stack: req.tech_stack,
            max_submissions: req.max_submissions,
            visibility: req.visibility,
            status: req.status,
        }
    }
}

/// `GET /api/bounties` query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListBountiesQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub poster_id: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListBountiesQuery> for ListBountiesInput {
    fn from(query: ListBountiesQuery) -> Self {
        Self {
            status: query.status,
            category: query.category,
            difficulty: query.difficulty,
            poster_id: query.poster_id,
            search: query.q,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyResponse {
    pub id: BountyId,
    pub poster_id: UserId,
    pub title: String,
    pub brief: String,
    pub detailed_spec: Option<String>,
    pub budget_min: i64,
    pub budget_max: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub max_submissions: i32,
    pub submission_count: i32,
    pub visibility: Visibility,
    pub status: BountyStatus,
    pub winner_id: Option<SubmissionId>,
    pub awarded_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bounty> for BountyResponse {
    fn from(b: Bounty) -> Self {
        Self {
            id: b.id,
            poster_id: b.poster_id,
            title: b.title,
            brief: b.brief,
            detailed_spec: b.detailed_spec,
            budget_min: b.budget_min,
            budget_max: b.budget_max,
            deadline: b.deadline,
            category: b.category,
            difficulty: b.difficulty,
            tags: b.tags,
            tech_stack: b.tech_stack,
            max_submissions: b.max_submissions,
            submission_count: b.submission_count,
            visibility: b.visibility,
            status: b.status,
            winner_id: b.winner_id,
            awarded_amount: b.awarded_amount,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<E, T: From<E>> From<Paged<E>> for PagedResponse<T> {
    fn from(paged: Paged<E>) -> Self {
        Self {
            items: paged.items.into_iter().map(T::from).collect(),
            total: paged.total,
            limit: paged.page.limit,
            offset: paged.page.offset,
        }
    }
}

// ============================================================================
// Submissions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub preview_url: Option<String>,
    pub tech_used: Option<Vec<String>>,
}

impl From<CreateSubmissionRequest> for NewSubmission {
    fn from(req: CreateSubmissionRequest) -> Self {
        Self {
            title: req.title.unwrap_or_default(),
            description: req.description,
            repo_url: req.repo_url,
            preview_url: req.preview_url,
            tech_used: req.tech_used.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateSubmissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub preview_url: Option<String>,
    pub tech_used: Option<Vec<String>>,
}

impl From<UpdateSubmissionRequest> for SubmissionPatchInput {
    fn from(req: UpdateSubmissionRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            repo_url: req.repo_url,
            preview_url: req.preview_url,
            tech_used: req.tech_used,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreRequest {
    /// Raw JSON so non-integers are a validation error, not a body rejection
    pub score: Option<serde_json::Value>,
    pub feedback: Option<String>,
}

impl From<ScoreRequest> for ScoreSubmissionInput {
    fn from(req: ScoreRequest) -> Self {
        Self {
            score: req.score,
            feedback: req.feedback,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub bounty_id: BountyId,
    pub builder_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub preview_url: String,
    pub tech_used: Vec<String>,
    pub status: SubmissionStatus,
    pub score: Option<i16>,
    pub feedback: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            bounty_id: s.bounty_id,
            builder_id: s.builder_id,
            title: s.title,
            description: s.description,
            repo_url: s.repo_url,
            preview_url: s.preview_url,
            tech_used: s.tech_used,
            status: s.status,
            score: s.score,
            feedback: s.feedback,
            reviewed_at: s.reviewed_at,
            deployed_at: s.deployed_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ============================================================================
// Award
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwardRequest {
    pub submission_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    pub bounty: BountyResponse,
    pub submission: SubmissionResponse,
    pub amount: i64,
}

impl From<AwardOutcome> for AwardResponse {
    fn from(outcome: AwardOutcome) -> Self {
        Self {
            amount: outcome.settlement.amount,
            bounty: outcome.bounty.into(),
            submission: outcome.submission.into(),
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: Option<String>,
    pub submission_id: Option<String>,
}

impl CreateCommentRequest {
    pub fn into_input(self) -> MarketResult<CreateCommentInput> {
        Ok(CreateCommentInput {
            content: self.content.unwrap_or_default(),
            submission_id: self
                .submission_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<SubmissionId>)
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: CommentId,
    pub bounty_id: BountyId,
    pub submission_id: Option<SubmissionId>,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            bounty_id: c.bounty_id,
            submission_id: c.submission_id,
            author_id: c.author_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}
