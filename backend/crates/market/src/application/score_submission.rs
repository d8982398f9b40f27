//! Score Submission Use Case
//!
//! Only the poster of the parent bounty may review a submission.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{SubmissionId, UserId};

use crate::domain::entities::{Submission, review_feedback};
use crate::domain::repository::SubmissionRepository;
use crate::domain::value_objects::Score;
use crate::error::{MarketError, MarketResult};

/// Score input; `score` is kept as raw JSON so `7.5` and `"7"` are rejected
#[derive(Debug, Clone, Default)]
pub struct ScoreSubmissionInput {
    pub score: Option<serde_json::Value>,
    pub feedback: Option<String>,
}

pub struct ScoreSubmissionUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
}

impl<S> ScoreSubmissionUseCase<S>
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
        input: ScoreSubmissionInput,
    ) -> MarketResult<Submission> {
        let score = match input.score.as_ref() {
            Some(value) => Score::from_json(value),
            None => Err(MarketError::validation("score is required")),
        };
        let feedback = review_feedback(input.feedback.as_deref());
        let now = Utc::now();

        let submission = self
            .submission_repo
            .update_submission(submission_id, move |submission, bounty| {
                bounty.ensure_poster(caller)?;
                submission.record_review(score?, feedback?, now);
                Ok(())
            })
            .await?;

        tracing::info!(
            submission_id = %submission_id,
            score = submission.score,
            "Submission scored"
        );
        Ok(submission)
    }
}
