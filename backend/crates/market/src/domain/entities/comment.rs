//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, CommentId, SubmissionId, UserId};

use crate::domain::entities::submission::Submission;
use crate::domain::value_objects::{COMMENT_MAX, required_text};
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub bounty_id: BountyId,
    pub submission_id: Option<SubmissionId>,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// `submission`, when given, must belong to `bounty_id`
    pub fn create(
        bounty_id: BountyId,
        submission: Option<&Submission>,
        author_id: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> MarketResult<Self> {
        let content = required_text("content", content, COMMENT_MAX)?;
        let submission_id = match submission {
            Some(s) if s.bounty_id != bounty_id => return Err(MarketError::SubmissionNotFound),
            Some(s) => Some(s.id),
            None => None,
        };

        Ok(Self {
            id: CommentId::new(),
            bounty_id,
            submission_id,
            author_id,
            content,
            created_at: now,
        })
    }

    pub fn ensure_author(&self, caller: UserId) -> MarketResult<()> {
        if self.author_id == caller {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::submission::NewSubmission;

    #[test]
    fn test_comment_content_bounds() {
        let bounty = BountyId::new();
        let author = UserId::new();

        assert!(matches!(
            Comment::create(bounty, None, author, "   ", Utc::now()),
            Err(MarketError::Validation(_))
        ));
        let long = "x".repeat(COMMENT_MAX + 1);
        assert!(matches!(
            Comment::create(bounty, None, author, &long, Utc::now()),
            Err(MarketError::Validation(_))
        ));

        let comment = Comment::create(bounty, None, author, " hi ", Utc::now()).unwrap();
        assert_eq!(comment.content, "hi");
        assert!(comment.ensure_author(author).is_ok());
        assert!(matches!(
            comment.ensure_author(UserId::new()),
            Err(MarketError::Forbidden)
        ));
    }

    #[test]
    fn test_comment_submission_must_match_bounty() {
        let other = Submission::create(
            BountyId::new(),
            UserId::new(),
            NewSubmission {
                title: "Elsewhere".into(),
                ..Default::default()
            },
            "/api/preview",
            Utc::now(),
        )
        .unwrap();

        assert!(matches!(
            Comment::create(BountyId::new(), Some(&other), UserId::new(), "hi", Utc::now()),
            Err(MarketError::SubmissionNotFound)
        ));

        let comment =
            Comment::create(other.bounty_id, Some(&other), UserId::new(), "hi", Utc::now())
                .unwrap();
        assert_eq!(comment.submission_id, Some(other.id));
    }
}
