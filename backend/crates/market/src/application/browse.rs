//! Browse Use Case
//!
//! Read-only queries. Private bounties are unlisted: they never appear in
//! public listings but can still be fetched by id.

use std::sync::Arc;

use kernel::id::{BountyId, SubmissionId, UserId};

use crate::application::config::MarketConfig;
use crate::domain::entities::{Bounty, Submission};
use crate::domain::repository::{BountyFilter, BountyRepository, Paged, SubmissionRepository};
use crate::domain::value_objects::{BountyStatus, Category, Difficulty};
use crate::error::{MarketError, MarketResult};

/// Raw browse query
#[derive(Debug, Clone, Default)]
pub struct ListBountiesInput {
    pub status: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub poster_id: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

impl ListBountiesInput {
    fn filter(&self) -> MarketResult<BountyFilter> {
        Ok(BountyFilter {
            status: non_blank(self.status.as_deref())
                .map(BountyStatus::parse)
                .transpose()?,
            category: non_blank(self.category.as_deref())
                .map(Category::parse)
                .transpose()?,
            difficulty: non_blank(self.difficulty.as_deref())
                .map(Difficulty::parse)
                .transpose()?,
            poster_id: non_blank(self.poster_id.as_deref())
                .map(str::parse::<UserId>)
                .transpose()?,
            search: non_blank(self.search.as_deref()).map(str::to_string),
            include_private: false,
        })
    }
}

pub struct BrowseUseCase<B, S>
where
    B: BountyRepository,
    S: SubmissionRepository,
{
    bounty_repo: Arc<B>,
    submission_repo: Arc<S>,
    config: Arc<MarketConfig>,
}

impl<B, S> BrowseUseCase<B, S>
where
    B: BountyRepository,
    S: SubmissionRepository,
{
    pub fn new(bounty_repo: Arc<B>, submission_repo: Arc<S>, config: Arc<MarketConfig>) -> Self {
        Self {
            bounty_repo,
            submission_repo,
            config,
        }
    }

    pub async fn get_bounty(&self, id: BountyId) -> MarketResult<Bounty> {
        self.bounty_repo
            .find_bounty(id)
            .await?
            .ok_or(MarketError::BountyNotFound)
    }

    /// Public listing
    pub async fn list_bounties(&self, input: ListBountiesInput) -> MarketResult<Paged<Bounty>> {
        let filter = input.filter()?;
        let page = self.config.page(input.limit, input.offset);
        self.bounty_repo.list_bounties(&filter, page).await
    }

    /// Everything the caller posted, private bounties included
    pub async fn my_bounties(
        &self,
        poster_id: UserId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> MarketResult<Paged<Bounty>> {
        let filter = BountyFilter {
            poster_id: Some(poster_id),
            include_private: true,
            ..Default::default()
        };
        let page = self.config.page(limit, offset);
        self.bounty_repo.list_bounties(&filter, page).await
    }

    pub async fn get_submission(&self, id: SubmissionId) -> MarketResult<Submission> {
        self.submission_repo
            .find_submission(id)
            .await?
            .ok_or(MarketError::SubmissionNotFound)
    }

    pub async fn submissions_for_bounty(&self, bounty_id: BountyId) -> MarketResult<Vec<Submission>> {
        self.get_bounty(bounty_id).await?;
        self.submission_repo
            .list_submissions_for_bounty(bounty_id)
            .await
    }

    pub async fn my_submissions(&self, builder_id: UserId) -> MarketResult<Vec<Submission>> {
        self.submission_repo
            .list_submissions_by_builder(builder_id)
            .await
    }
}
