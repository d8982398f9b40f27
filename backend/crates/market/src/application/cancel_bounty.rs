//! Cancel Bounty Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{BountyId, UserId};

use crate::domain::entities::Bounty;
use crate::domain::repository::BountyRepository;
use crate::error::MarketResult;

pub struct CancelBountyUseCase<B>
where
    B: BountyRepository,
{
    bounty_repo: Arc<B>,
}

impl<B> CancelBountyUseCase<B>
where
    B: BountyRepository,
{
    pub fn new(bounty_repo: Arc<B>) -> Self {
        Self { bounty_repo }
    }

    pub async fn execute(&self, caller: UserId, bounty_id: BountyId) -> MarketResult<Bounty> {
        let now = Utc::now();
        let bounty = self
            .bounty_repo
            .update_bounty(bounty_id, move |bounty| bounty.cancel(caller, now))
            .await?;

        tracing::info!(bounty_id = %bounty_id, "Bounty cancelled");
        Ok(bounty)
    }
}
