//! Update Bounty Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{BountyId, UserId};

use crate::application::config::MarketConfig;
use crate::domain::entities::{Bounty, BountyPatch, BountyPatchInput};
use crate::domain::repository::BountyRepository;
use crate::error::MarketResult;

pub struct UpdateBountyUseCase<B>
where
    B: BountyRepository,
{
    bounty_repo: Arc<B>,
    config: Arc<MarketConfig>,
}

impl<B> UpdateBountyUseCase<B>
where
    B: BountyRepository,
{
    pub fn new(bounty_repo: Arc<B>, config: Arc<MarketConfig>) -> Self {
        Self {
            bounty_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        caller: UserId,
        bounty_id: BountyId,
        input: BountyPatchInput,
    ) -> MarketResult<Bounty> {
        // Ownership is reported before malformed input
        let patch = BountyPatch::parse(input);
        let limits = self.config.limits;
        let now = Utc::now();

        let bounty = self
            .bounty_repo
            .update_bounty(bounty_id, move |bounty| {
                bounty.ensure_poster(caller)?;
                bounty.apply_patch(caller, patch?, &limits, now)
            })
            .await?;

        tracing::info!(bounty_id = %bounty_id, status = %bounty.status, "Bounty updated");
        Ok(bounty)
    }
}
