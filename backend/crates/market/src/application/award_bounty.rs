//! Award Bounty Use Case
//!
//! Bounty, winning submission and both users' aggregates change together
//! or not at all. Concurrent awards on one bounty serialize on the bounty
//! row lock; the loser sees `AlreadyAwarded`.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{BountyId, SubmissionId, UserId};

use crate::application::config::MarketConfig;
use crate::domain::repository::{AwardOutcome, AwardRepository};
use crate::error::MarketResult;

pub struct AwardBountyUseCase<A>
where
    A: AwardRepository,
{
    award_repo: Arc<A>,
    config: Arc<MarketConfig>,
}

impl<A> AwardBountyUseCase<A>
where
    A: AwardRepository,
{
    pub fn new(award_repo: Arc<A>, config: Arc<MarketConfig>) -> Self {
        Self { award_repo, config }
    }

    pub async fn execute(
        &self,
        caller: UserId,
        bounty_id: BountyId,
        submission_id: SubmissionId,
    ) -> MarketResult<AwardOutcome> {
        let outcome = self
            .award_repo
            .award(
                bounty_id,
                submission_id,
                caller,
                self.config.reputation_per_award,
                Utc::now(),
            )
            .await?;

        tracing::info!(
            bounty_id = %bounty_id,
            submission_id = %submission_id,
            builder_id = %outcome.settlement.builder_id,
            amount = outcome.settlement.amount,
            "Bounty awarded"
        );

        Ok(outcome)
    }
}
