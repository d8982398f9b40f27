//! Update Submission Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{SubmissionId, UserId};

use crate::domain::entities::{Submission, SubmissionPatch, SubmissionPatchInput};
use crate::domain::repository::SubmissionRepository;
use crate::error::MarketResult;

pub struct UpdateSubmissionUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
}

impl<S> UpdateSubmissionUseCase<S>
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
        input: SubmissionPatchInput,
    ) -> MarketResult<Submission> {
        let patch = SubmissionPatch::parse(input);
        let now = Utc::now();

        let submission = self
            .submission_repo
            .update_submission(submission_id, move |submission, _bounty| {
                submission.ensure_builder(caller)?;
                submission.apply_patch(caller, patch?, now)
            })
            .await?;

        tracing::debug!(submission_id = %submission_id, "Submission updated");
        Ok(submission)
    }
}
