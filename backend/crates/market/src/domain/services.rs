//! Domain Services
//!
//! Award settlement touches two entities and three user aggregates, so it
//! lives outside either entity. Every store runs it against rows it has
//! locked and persists the result in one transaction.

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, SubmissionId, UserId};

use crate::domain::entities::{Bounty, Submission};
use crate::domain::value_objects::BountyStatus;
use crate::error::{MarketError, MarketResult};

/// Aggregate deltas produced by a successful award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardSettlement {
    pub bounty_id: BountyId,
    pub submission_id: SubmissionId,
    pub poster_id: UserId,
    pub builder_id: UserId,
    pub amount: i64,
    pub reputation_bonus: i64,
}

/// Check every award precondition, then mutate both entities.
///
/// Order: ownership, bounty status, submission existence and ownership,
/// submission status. Nothing is mutated unless all checks pass.
pub fn settle_award(
    bounty: &mut Bounty,
    submission: Option<&mut Submission>,
    caller: UserId,
    reputation_bonus: i64,
    now: DateTime<Utc>,
) -> MarketResult<AwardSettlement> {
    bounty.authorize_award(caller)?;

    let submission = match submission {
        Some(s) if s.bounty_id == bounty.id => s,
        _ => return Err(MarketError::SubmissionNotFound),
    };
    submission.mark_winner(now)?;

    let amount = bounty.budget_max;
    bounty.status = BountyStatus::Awarded;
    bounty.winner_id = Some(submission.id);
    bounty.awarded_amount = Some(amount);
    bounty.updated_at = now;

    Ok(AwardSettlement {
        bounty_id: bounty.id,
        submission_id: submission.id,
        poster_id: bounty.poster_id,
        builder_id: submission.builder_id,
        amount,
        reputation_bonus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{BountyLimits, NewBounty, NewSubmission};
    use crate::domain::value_objects::SubmissionStatus;

    fn fixture() -> (Bounty, Submission) {
        let bounty = Bounty::create(
            UserId::new(),
            NewBounty {
                title: "Bounty".into(),
                brief: "Brief".into(),
                budget_min: Some(500),
                budget_max: Some(2000),
                ..Default::default()
            },
            &BountyLimits::default(),
            Utc::now(),
        )
        .unwrap();
        let submission = Submission::create(
            bounty.id,
            UserId::new(),
            NewSubmission {
                title: "Entry".into(),
                ..Default::default()
            },
            "/api/preview",
            Utc::now(),
        )
        .unwrap();
        (bounty, submission)
    }

    #[test]
    fn test_settle_award_pays_budget_max() {
        let (mut bounty, mut submission) = fixture();
        let poster = bounty.poster_id;

        let settlement =
            settle_award(&mut bounty, Some(&mut submission), poster, 100, Utc::now()).unwrap();

        assert_eq!(settlement.amount, 2000);
        assert_eq!(settlement.builder_id, submission.builder_id);
        assert_eq!(bounty.status, BountyStatus::Awarded);
        assert_eq!(bounty.winner_id, Some(submission.id));
        assert_eq!(bounty.awarded_amount, Some(2000));
        assert_eq!(submission.status, SubmissionStatus::Winner);
    }

    #[test]
    fn test_settle_award_checks_owner_before_submission() {
        let (mut bounty, _) = fixture();
        let err = settle_award(&mut bounty, None, UserId::new(), 100, Utc::now()).unwrap_err();
        assert!(matches!(err, MarketError::Forbidden));
    }

    #[test]
    fn test_settle_award_rejects_foreign_submission() {
        let (mut bounty, _) = fixture();
        let (_, mut foreign) = fixture();
        let poster = bounty.poster_id;

        let err =
            settle_award(&mut bounty, Some(&mut foreign), poster, 100, Utc::now()).unwrap_err();
        assert!(matches!(err, MarketError::SubmissionNotFound));
        assert_eq!(bounty.status, BountyStatus::Open);
        assert_eq!(foreign.status, SubmissionStatus::Pending);
    }

    #[test]
    fn test_settle_award_leaves_bounty_untouched_on_bad_submission_status() {
        let (mut bounty, mut submission) = fixture();
        submission.status = SubmissionStatus::Withdrawn;
        let poster = bounty.poster_id;

        let err =
            settle_award(&mut bounty, Some(&mut submission), poster, 100, Utc::now()).unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
        assert_eq!(bounty.status, BountyStatus::Open);
        assert_eq!(bounty.winner_id, None);
    }

    #[test]
    fn test_second_award_is_rejected() {
        let (mut bounty, mut submission) = fixture();
        let poster = bounty.poster_id;
        settle_award(&mut bounty, Some(&mut submission), poster, 100, Utc::now()).unwrap();

        let err =
            settle_award(&mut bounty, Some(&mut submission), poster, 100, Utc::now()).unwrap_err();
        assert!(matches!(err, MarketError::AlreadyAwarded));
    }
}
