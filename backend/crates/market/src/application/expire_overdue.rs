//! Expire Overdue Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::repository::BountyRepository;
use crate::error::MarketResult;

/// Moves `open` / `in_review` bounties past their deadline to `expired`
pub struct ExpireOverdueUseCase<B>
where
    B: BountyRepository,
{
    bounty_repo: Arc<B>,
}

impl<B> ExpireOverdueUseCase<B>
where
    B: BountyRepository,
{
    pub fn new(bounty_repo: Arc<B>) -> Self {
        Self { bounty_repo }
    }

    pub async fn execute(&self, now: DateTime<Utc>) -> MarketResult<u64> {
        let expired = self.bounty_repo.expire_overdue(now).await?;
        if expired > 0 {
            tracing::info!(expired, "Expired overdue bounties");
        }
        Ok(expired)
    }
}
