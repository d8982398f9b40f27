//! HTTP Handlers
//!
//! Ids arrive as raw path segments and are parsed here, so a malformed id
//! is a validation error rendered like every other market error. Bodies and
//! query strings go through `WithRejection`, so a mistyped field is a 400
//! problem response as well.

use std::sync::Arc;

use auth::CurrentUser;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;
use kernel::error::app_error::AppError;
use kernel::id::{BountyId, CommentId, SubmissionId};

use crate::application::config::MarketConfig;
use crate::application::{
    AwardBountyUseCase, BrowseUseCase, CancelBountyUseCase, CommentUseCase, CreateBountyUseCase,
    CreateSubmissionUseCase, MarkLiveUseCase, ScoreSubmissionUseCase, UpdateBountyUseCase,
    UpdateSubmissionUseCase,
};
use crate::domain::entities::Submission;
use crate::domain::repository::MarketStore;
use crate::error::{MarketError, MarketResult};
use crate::presentation::dto::{
    AwardRequest, AwardResponse, BountyResponse, CommentResponse, CreateBountyRequest,
    CreateCommentRequest, CreateSubmissionRequest, ListBountiesQuery, PageQuery, PagedResponse,
    ScoreRequest, SubmissionResponse, UpdateBountyRequest, UpdateSubmissionRequest,
};

/// Shared state for market handlers
#[derive(Clone)]
pub struct MarketAppState<R>
where
    R: MarketStore,
{
    pub repo: Arc<R>,
    pub config: Arc<MarketConfig>,
}

impl<R> MarketAppState<R>
where
    R: MarketStore,
{
    fn browse(&self) -> BrowseUseCase<R, R> {
        BrowseUseCase::new(self.repo.clone(), self.repo.clone(), self.config.clone())
    }

    fn comments(&self) -> CommentUseCase<R, R, R> {
        CommentUseCase::new(self.repo.clone(), self.repo.clone(), self.repo.clone())
    }
}

fn submissions_response(items: Vec<Submission>) -> Json<Vec<SubmissionResponse>> {
    Json(items.into_iter().map(SubmissionResponse::from).collect())
}

// ============================================================================
// Bounties
// ============================================================================

/// GET /api/bounties
pub async fn list_bounties<R>(
    State(state): State<MarketAppState<R>>,
    WithRejection(Query(query), _): WithRejection<Query<ListBountiesQuery>, AppError>,
) -> MarketResult<Json<PagedResponse<BountyResponse>>>
where
    R: MarketStore,
{
    let paged = state.browse().list_bounties(query.into()).await?;
    Ok(Json(paged.into()))
}

/// POST /api/bounties
pub async fn create_bounty<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateBountyRequest>, AppError>,
) -> MarketResult<(StatusCode, Json<BountyResponse>)>
where
    R: MarketStore,
{
    let bounty = CreateBountyUseCase::new(state.repo.clone(), state.config.clone())
        .execute(current.id(), req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(bounty.into())))
}

/// GET /api/bounties/{id}
pub async fn get_bounty<R>(
    State(state): State<MarketAppState<R>>,
    Path(id): Path<String>,
) -> MarketResult<Json<BountyResponse>>
where
    R: MarketStore,
{
    let bounty = state.browse().get_bounty(id.parse()?).await?;
    Ok(Json(bounty.into()))
}

/// PATCH /api/bounties/{id}
pub async fn update_bounty<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateBountyRequest>, AppError>,
) -> MarketResult<Json<BountyResponse>>
where
    R: MarketStore,
{
    let bounty = UpdateBountyUseCase::new(state.repo.clone(), state.config.clone())
        .execute(current.id(), id.parse()?, req.into())
        .await?;

    Ok(Json(bounty.into()))
}

/// POST /api/bounties/{id}/cancel
pub async fn cancel_bounty<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> MarketResult<Json<BountyResponse>>
where
    R: MarketStore,
{
    let bounty = CancelBountyUseCase::new(state.repo.clone())
        .execute(current.id(), id.parse()?)
        .await?;

    Ok(Json(bounty.into()))
}

/// POST /api/bounties/{id}/award
pub async fn award_bounty<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<AwardRequest>, AppError>,
) -> MarketResult<Json<AwardResponse>>
where
    R: MarketStore,
{
    let bounty_id: BountyId = id.parse()?;
    let submission_id: SubmissionId = req
        .submission_id
        .as_deref()
        .ok_or_else(|| MarketError::validation("submissionId is required"))?
        .trim()
        .parse()?;

    let outcome = AwardBountyUseCase::new(state.repo.clone(), state.config.clone())
        .execute(current.id(), bounty_id, submission_id)
        .await?;

    Ok(Json(outcome.into()))
}

/// GET /api/me/bounties
pub async fn my_bounties<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    WithRejection(Query(page), _): WithRejection<Query<PageQuery>, AppError>,
) -> MarketResult<Json<PagedResponse<BountyResponse>>>
where
    R: MarketStore,
{
    let paged = state
        .browse()
        .my_bounties(current.id(), page.limit, page.offset)
        .await?;
    Ok(Json(paged.into()))
}

// ============================================================================
// Submissions
// ============================================================================

/// GET /api/bounties/{id}/submissions
pub async fn list_submissions<R>(
    State(state): State<MarketAppState<R>>,
    Path(id): Path<String>,
) -> MarketResult<Json<Vec<SubmissionResponse>>>
where
    R: MarketStore,
{
    let items = state.browse().submissions_for_bounty(id.parse()?).await?;
    Ok(submissions_response(items))
}

/// POST /api/bounties/{id}/submissions
pub async fn create_submission<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<CreateSubmissionRequest>, AppError>,
) -> MarketResult<(StatusCode, Json<SubmissionResponse>)>
where
    R: MarketStore,
{
    let submission = CreateSubmissionUseCase::new(state.repo.clone(), state.config.clone())
        .execute(current.id(), id.parse()?, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// GET /api/submissions/{id}
pub async fn get_submission<R>(
    State(state): State<MarketAppState<R>>,
    Path(id): Path<String>,
) -> MarketResult<Json<SubmissionResponse>>
where
    R: MarketStore,
{
    let submission = state.browse().get_submission(id.parse()?).await?;
    Ok(Json(submission.into()))
}

/// PATCH /api/submissions/{id}
pub async fn update_submission<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateSubmissionRequest>, AppError>,
) -> MarketResult<Json<SubmissionResponse>>
where
    R: MarketStore,
{
    let submission = UpdateSubmissionUseCase::new(state.repo.clone())
        .execute(current.id(), id.parse()?, req.into())
        .await?;

    Ok(Json(submission.into()))
}

/// POST /api/submissions/{id}/score
pub async fn score_submission<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<ScoreRequest>, AppError>,
) -> MarketResult<Json<SubmissionResponse>>
where
    R: MarketStore,
{
    let submission = ScoreSubmissionUseCase::new(state.repo.clone())
        .execute(current.id(), id.parse()?, req.into())
        .await?;

    Ok(Json(submission.into()))
}

/// POST /api/submissions/{id}/live
pub async fn mark_live<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> MarketResult<Json<SubmissionResponse>>
where
    R: MarketStore,
{
    let submission = MarkLiveUseCase::new(state.repo.clone())
        .execute(current.id(), id.parse()?)
        .await?;

    Ok(Json(submission.into()))
}

/// GET /api/me/submissions
pub async fn my_submissions<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
) -> MarketResult<Json<Vec<SubmissionResponse>>>
where
    R: MarketStore,
{
    let items = state.browse().my_submissions(current.id()).await?;
    Ok(submissions_response(items))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/bounties/{id}/comments
pub async fn list_comments<R>(
    State(state): State<MarketAppState<R>>,
    Path(id): Path<String>,
) -> MarketResult<Json<Vec<CommentResponse>>>
where
    R: MarketStore,
{
    let comments = state.comments().list(id.parse()?).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// POST /api/bounties/{id}/comments
pub async fn create_comment<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<CreateCommentRequest>, AppError>,
) -> MarketResult<(StatusCode, Json<CommentResponse>)>
where
    R: MarketStore,
{
    let comment = state
        .comments()
        .create(current.id(), id.parse()?, req.into_input()?)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment<R>(
    State(state): State<MarketAppState<R>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> MarketResult<StatusCode>
where
    R: MarketStore,
{
    let comment_id: CommentId = id.parse()?;
    state.comments().delete(current.id(), comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
