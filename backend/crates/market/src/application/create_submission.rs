//! Create Submission Use Case
//!
//! The insert and the bounty counter bump are one transaction in the
//! repository; this use case only builds and validates the row.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{BountyId, UserId};

use crate::application::config::MarketConfig;
use crate::domain::entities::{NewSubmission, Submission};
use crate::domain::repository::SubmissionRepository;
use crate::error::MarketResult;

pub struct CreateSubmissionUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
    config: Arc<MarketConfig>,
}

impl<S> CreateSubmissionUseCase<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>, config: Arc<MarketConfig>) -> Self {
        Self {
            submission_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        builder_id: UserId,
        bounty_id: BountyId,
        input: NewSubmission,
    ) -> MarketResult<Submission> {
        let submission = Submission::create(
            bounty_id,
            builder_id,
            input,
            &self.config.preview_base_url,
            Utc::now(),
        )?;

        let bounty = self.submission_repo.create_submission(&submission).await?;

        tracing::info!(
            submission_id = %submission.id,
            bounty_id = %bounty_id,
            builder_id = %builder_id,
            submission_count = bounty.submission_count,
            max_submissions = bounty.max_submissions,
            "Submission accepted"
        );

        Ok(submission)
    }
}
