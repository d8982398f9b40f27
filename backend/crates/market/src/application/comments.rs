//! Comment Use Case

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{BountyId, CommentId, SubmissionId, UserId};

use crate::domain::entities::Comment;
use crate::domain::repository::{BountyRepository, CommentRepository, SubmissionRepository};
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub content: String,
    pub submission_id: Option<SubmissionId>,
}

pub struct CommentUseCase<B, S, C>
where
    B: BountyRepository,
    S: SubmissionRepository,
    C: CommentRepository,
{
    bounty_repo: Arc<B>,
    submission_repo: Arc<S>,
    comment_repo: Arc<C>,
}

impl<B, S, C> CommentUseCase<B, S, C>
where
    B: BountyRepository,
    S: SubmissionRepository,
    C: CommentRepository,
{
    pub fn new(bounty_repo: Arc<B>, submission_repo: Arc<S>, comment_repo: Arc<C>) -> Self {
        Self {
            bounty_repo,
            submission_repo,
            comment_repo,
        }
    }

    async fn ensure_bounty(&self, bounty_id: BountyId) -> MarketResult<()> {
        match self.bounty_repo.find_bounty(bounty_id).await? {
            Some(_) => Ok(()),
            None => Err(MarketError::BountyNotFound),
        }
    }

    pub async fn create(
        &self,
        author_id: UserId,
        bounty_id: BountyId,
        input: CreateCommentInput,
    ) -> MarketResult<Comment> {
        self.ensure_bounty(bounty_id).await?;

        let submission = match input.submission_id {
            Some(id) => Some(
                self.submission_repo
                    .find_submission(id)
                    .await?
                    .ok_or(MarketError::SubmissionNotFound)?,
            ),
            None => None,
        };

        let comment = Comment::create(
            bounty_id,
            submission.as_ref(),
            author_id,
            &input.content,
            Utc::now(),
        )?;
        self.comment_repo.create_comment(&comment).await?;

        tracing::debug!(comment_id = %comment.id, bounty_id = %bounty_id, "Comment posted");
        Ok(comment)
    }

    pub async fn list(&self, bounty_id: BountyId) -> MarketResult<Vec<Comment>> {
        self.ensure_bounty(bounty_id).await?;
        self.comment_repo.list_comments(bounty_id).await
    }

    /// Author-only
    pub async fn delete(&self, caller: UserId, comment_id: CommentId) -> MarketResult<()> {
        let comment = self
            .comment_repo
            .find_comment(comment_id)
            .await?
            .ok_or(MarketError::CommentNotFound)?;
        comment.ensure_author(caller)?;

        // Lost a race with another delete
        if !self.comment_repo.delete_comment(comment_id, caller).await? {
            return Err(MarketError::CommentNotFound);
        }

        tracing::debug!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }
}
