//! Mark Live Use Case
//!
//! Called by the builder once the preview deployment is reachable.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{SubmissionId, UserId};

use crate::domain::entities::Submission;
use crate::domain::repository::SubmissionRepository;
use crate::error::MarketResult;

pub struct MarkLiveUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
}

impl<S> MarkLiveUseCase<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>) -> Self {
        Self { submission_repo }
    }

    pub async fn execute(
        &self,
        caller: UserId,
        submission_id: SubmissionId,
    ) -> MarketResult<Submission> {
        let now = Utc::now();
        let submission = self
            .submission_repo
            .update_submission(submission_id, move |submission, _bounty| {
                submission.mark_live(caller, now)
            })
            .await?;

        tracing::info!(
            submission_id = %submission_id,
            preview_url = %submission.preview_url,
            "Submission live"
        );
        Ok(submission)
    }
}
