//! Create Bounty Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::MarketConfig;
use crate::domain::entities::{Bounty, NewBounty};
use crate::domain::repository::BountyRepository;
use crate::error::MarketResult;

pub struct CreateBountyUseCase<B>
where
    B: BountyRepository,
{
    bounty_repo: Arc<B>,
    config: Arc<MarketConfig>,
}

impl<B> CreateBountyUseCase<B>
where
    B: BountyRepository,
{
    pub fn new(bounty_repo: Arc<B>, config: Arc<MarketConfig>) -> Self {
        Self {
            bounty_repo,
            config,
        }
    }

    pub async fn execute(&self, poster_id: UserId, input: NewBounty) -> MarketResult<Bounty> {
        let bounty = Bounty::create(poster_id, input, &self.config.limits, Utc::now())?;
        self.bounty_repo.create_bounty(&bounty).await?;

        tracing::info!(
            bounty_id = %bounty.id,
            poster_id = %poster_id,
            budget_max = bounty.budget_max,
            "Bounty created"
        );

        Ok(bounty)
    }
}
