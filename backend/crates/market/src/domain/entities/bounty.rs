//! Bounty Entity
//!
//! All rules that decide whether a bounty may change live here, so the
//! PostgreSQL repository and any other store enforce exactly the same
//! state machine on the row they hold locked.

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, SubmissionId, UserId};

use crate::domain::value_objects::{
    BRIEF_MAX, Budget, BountyStatus, Category, DETAILED_SPEC_MAX, Difficulty, TITLE_MAX,
    Visibility, optional_text, parse_deadline, required_text, tag_list,
};
use crate::error::{MarketError, MarketResult};

/// Numeric limits applied on create and update
#[derive(Debug, Clone, Copy)]
pub struct BountyLimits {
    pub budget_ceiling: i64,
    pub default_max_submissions: i32,
    pub max_submissions_ceiling: i32,
}

impl Default for BountyLimits {
    fn default() -> Self {
        Self {
            budget_ceiling: 1_000_000,
            default_max_submissions: 50,
            max_submissions_ceiling: 1_000,
        }
    }
}

impl BountyLimits {
    fn max_submissions(&self, raw: i64) -> MarketResult<i32> {
        if raw < 1 || raw > i64::from(self.max_submissions_ceiling) {
            return Err(MarketError::validation(format!(
                "maxSubmissions must be between 1 and {}",
                self.max_submissions_ceiling
            )));
        }
        Ok(raw as i32)
    }
}

#[derive(Debug, Clone)]
pub struct Bounty {
    pub id: BountyId,
    /// Immutable after creation
    pub poster_id: UserId,
    pub title: String,
    pub brief: String,
    pub detailed_spec: Option<String>,
    pub budget_min: i64,
    pub budget_max: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub max_submissions: i32,
    /// Only ever incremented together with a submission insert
    pub submission_count: i32,
    pub visibility: Visibility,
    pub status: BountyStatus,
    pub winner_id: Option<SubmissionId>,
    pub awarded_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated create request
#[derive(Debug, Clone, Default)]
pub struct NewBounty {
    pub title: String,
    pub brief: String,
    pub detailed_spec: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub max_submissions: Option<i64>,
    pub visibility: Option<String>,
}

/// Blank optional strings mean "not supplied"
fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

impl Bounty {
    /// Validate everything first; nothing is built from a partial input
    pub fn create(
        poster_id: UserId,
        input: NewBounty,
        limits: &BountyLimits,
        now: DateTime<Utc>,
    ) -> MarketResult<Self> {
        let title = required_text("title", &input.title, TITLE_MAX)?;
        let brief = required_text("brief", &input.brief, BRIEF_MAX)?;
        let detailed_spec =
            optional_text("detailedSpec", input.detailed_spec.as_deref(), DETAILED_SPEC_MAX)?;

        let budget_min = input
            .budget_min
            .ok_or_else(|| MarketError::validation("budgetMin is required"))?;
        let budget_max = input
            .budget_max
            .ok_or_else(|| MarketError::validation("budgetMax is required"))?;
        let budget = Budget::new(budget_min, budget_max, limits.budget_ceiling)?;

        let deadline = non_blank(input.deadline.as_deref())
            .map(parse_deadline)
            .transpose()?;
        let category = non_blank(input.category.as_deref())
            .map(Category::parse)
            .transpose()?;
        let difficulty = non_blank(input.difficulty.as_deref())
            .map(Difficulty::parse)
            .transpose()?;
        let visibility = non_blank(input.visibility.as_deref())
            .map(Visibility::parse)
            .transpose()?
            .unwrap_or_default();
        let max_submissions = match input.max_submissions {
            Some(raw) => limits.max_submissions(raw)?,
            None => limits.default_max_submissions,
        };

        Ok(Self {
            id: BountyId::new(),
            poster_id,
            title,
            brief,
            detailed_spec,
            budget_min: budget.min(),
            budget_max: budget.max(),
            deadline,
            category,
            difficulty,
            tags: tag_list("tags", &input.tags)?,
            tech_stack: tag_list("techStack", &input.tech_stack)?,
            max_submissions,
            submission_count: 0,
            visibility,
            status: BountyStatus::Open,
            winner_id: None,
            awarded_amount: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn ensure_poster(&self, caller: UserId) -> MarketResult<()> {
        if self.poster_id == caller {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }

    fn ensure_not_final(&self) -> MarketResult<()> {
        if self.status.is_final() {
            return Err(MarketError::BountyFinalized {
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Owner edit of allow-listed fields
    pub fn apply_patch(
        &mut self,
        caller: UserId,
        patch: BountyPatch,
        limits: &BountyLimits,
        now: DateTime<Utc>,
    ) -> MarketResult<()> {
        self.ensure_poster(caller)?;
        if patch.is_empty() {
            return Err(MarketError::NoOp);
        }
        self.ensure_not_final()?;

        let budget = Budget::new(
            patch.budget_min.unwrap_or(self.budget_min),
            patch.budget_max.unwrap_or(self.budget_max),
            limits.budget_ceiling,
        )?;

        let max_submissions = match patch.max_submissions {
            Some(raw) => {
                let max = limits.max_submissions(raw)?;
                if max < self.submission_count {
                    return Err(MarketError::validation(format!(
                        "maxSubmissions cannot be lower than the {} submissions already received",
                        self.submission_count
                    )));
                }
                max
            }
            None => self.max_submissions,
        };

        if let Some(to) = patch.status
            && to != self.status
        {
            // Awarding always goes through the award transaction
            if to == BountyStatus::Awarded || !self.status.can_transition_to(to) {
                return Err(MarketError::invalid_transition(self.status, to));
            }
        }

        // All checks passed; apply
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(brief) = patch.brief {
            self.brief = brief;
        }
        if let Some(detailed_spec) = patch.detailed_spec {
            self.detailed_spec = detailed_spec;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(tech_stack) = patch.tech_stack {
            self.tech_stack = tech_stack;
        }
        if let Some(visibility) = patch.visibility {
            self.visibility = visibility;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.budget_min = budget.min();
        self.budget_max = budget.max();
        self.max_submissions = max_submissions;
        self.updated_at = now;

        Ok(())
    }

    pub fn cancel(&mut self, caller: UserId, now: DateTime<Utc>) -> MarketResult<()> {
        self.ensure_poster(caller)?;
        if !self.status.can_transition_to(BountyStatus::Cancelled) {
            return Err(MarketError::invalid_transition(
                self.status,
                BountyStatus::Cancelled,
            ));
        }
        self.status = BountyStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Gate for a new submission; bumps the counter on success.
    /// The caller must persist the counter in the same transaction as the insert.
    ///
    /// An open bounty past its deadline is refused as `expired` even before
    /// the sweep has flipped its status.
    pub fn accept_submission(
        &mut self,
        builder_already_submitted: bool,
        now: DateTime<Utc>,
    ) -> MarketResult<()> {
        if self.status != BountyStatus::Open {
            return Err(MarketError::BountyNotOpen {
                status: self.status.to_string(),
            });
        }
        if self.is_overdue(now) {
            return Err(MarketError::BountyNotOpen {
                status: BountyStatus::Expired.to_string(),
            });
        }
        if self.submission_count >= self.max_submissions {
            return Err(MarketError::MaxSubmissionsReached);
        }
        if builder_already_submitted {
            return Err(MarketError::DuplicateSubmission);
        }
        self.submission_count += 1;
        Ok(())
    }

    /// Owner and status preconditions of the award transaction
    pub fn authorize_award(&self, caller: UserId) -> MarketResult<()> {
        self.ensure_poster(caller)?;
        match self.status {
            BountyStatus::Awarded => Err(MarketError::AlreadyAwarded),
            status if !status.can_transition_to(BountyStatus::Awarded) => Err(
                MarketError::invalid_transition(status, BountyStatus::Awarded),
            ),
            _ => Ok(()),
        }
    }

    /// Past its deadline while still running
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_running() && self.deadline.is_some_and(|deadline| deadline < now)
    }

    pub fn expire_if_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_overdue(now) {
            return false;
        }
        self.status = BountyStatus::Expired;
        self.updated_at = now;
        true
    }
}

// ============================================================================
// Patch
// ============================================================================

/// Unvalidated update request; `None` means "leave unchanged".
/// For nullable fields an empty string clears the value.
#[derive(Debug, Clone, Default)]
pub struct BountyPatchInput {
    pub title: Option<String>,
    pub brief: Option<String>,
    pub detailed_spec: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub max_submissions: Option<i64>,
    pub visibility: Option<String>,
    pub status: Option<String>,
}

/// Validated update: exactly the fields an owner may change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BountyPatch {
    pub title: Option<String>,
    pub brief: Option<String>,
    pub detailed_spec: Option<Option<String>>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub category: Option<Option<Category>>,
    pub difficulty: Option<Option<Difficulty>>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub max_submissions: Option<i64>,
    pub visibility: Option<Visibility>,
    pub status: Option<BountyStatus>,
}

/// `Some("")` clears, `Some(x)` sets, `None` leaves alone
fn clearable<T>(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> MarketResult<T>,
) -> MarketResult<Option<Option<T>>> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(value) => parse(value).map(|v| Some(Some(v))),
    }
}

impl BountyPatch {
    pub fn parse(input: BountyPatchInput) -> MarketResult<Self> {
        Ok(Self {
            title: input
                .title
                .as_deref()
                .map(|t| required_text("title", t, TITLE_MAX))
                .transpose()?,
            brief: input
                .brief
                .as_deref()
                .map(|b| required_text("brief", b, BRIEF_MAX))
                .transpose()?,
            detailed_spec: clearable(input.detailed_spec.as_deref(), |s| {
                required_text("detailedSpec", s, DETAILED_SPEC_MAX)
            })?,
            budget_min: input.budget_min,
            budget_max: input.budget_max,
            deadline: clearable(input.deadline.as_deref(), parse_deadline)?,
            category: clearable(input.category.as_deref(), Category::parse)?,
            difficulty: clearable(input.difficulty.as_deref(), Difficulty::parse)?,
            tags: input
                .tags
                .as_deref()
                .map(|t| tag_list("tags", t))
                .transpose()?,
            tech_stack: input
                .tech_stack
                .as_deref()
                .map(|t| tag_list("techStack", t))
                .transpose()?,
            max_submissions: input.max_submissions,
            visibility: input
                .visibility
                .as_deref()
                .map(Visibility::parse)
                .transpose()?,
            status: input
                .status
                .as_deref()
                .map(BountyStatus::parse)
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_bounty(max_submissions: Option<i64>) -> NewBounty {
        NewBounty {
            title: "Build a landing page".into(),
            brief: "One page, responsive".into(),
            budget_min: Some(500),
            budget_max: Some(2000),
            max_submissions,
            ..NewBounty::default()
        }
    }

    fn open_bounty(poster: UserId) -> Bounty {
        Bounty::create(poster, new_bounty(Some(2)), &BountyLimits::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let poster = UserId::new();
        let bounty = Bounty::create(
            poster,
            new_bounty(None),
            &BountyLimits::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(bounty.status, BountyStatus::Open);
        assert_eq!(bounty.visibility, Visibility::Public);
        assert_eq!(bounty.max_submissions, 50);
        assert_eq!(bounty.submission_count, 0);
        assert_eq!(bounty.winner_id, None);
    }

    #[test]
    fn test_create_validation() {
        let limits = BountyLimits::default();
        let now = Utc::now();
        let poster = UserId::new();

        let cases: Vec<NewBounty> = vec![
            NewBounty {
                title: "  ".into(),
                ..new_bounty(None)
            },
            NewBounty {
                budget_min: None,
                ..new_bounty(None)
            },
            NewBounty {
                budget_min: Some(3000),
                ..new_bounty(None)
            },
            NewBounty {
                budget_max: Some(1_000_001),
                ..new_bounty(None)
            },
            NewBounty {
                category: Some("gardening".into()),
                ..new_bounty(None)
            },
            NewBounty {
                deadline: Some("soon".into()),
                ..new_bounty(None)
            },
            new_bounty(Some(0)),
            new_bounty(Some(1001)),
        ];

        for input in cases {
            let err = Bounty::create(poster, input.clone(), &limits, now).unwrap_err();
            assert!(matches!(err, MarketError::Validation(_)), "{input:?}");
        }
    }

    #[test]
    fn test_patch_requires_owner_and_fields() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);
        let limits = BountyLimits::default();

        let patch = BountyPatch::parse(BountyPatchInput {
            title: Some("New title".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            bounty.apply_patch(UserId::new(), patch.clone(), &limits, Utc::now()),
            Err(MarketError::Forbidden)
        ));

        assert!(matches!(
            bounty.apply_patch(poster, BountyPatch::default(), &limits, Utc::now()),
            Err(MarketError::NoOp)
        ));

        let before = bounty.updated_at;
        let later = before + Duration::seconds(5);
        bounty.apply_patch(poster, patch, &limits, later).unwrap();
        assert_eq!(bounty.title, "New title");
        assert_eq!(bounty.updated_at, later);
    }

    #[test]
    fn test_patch_validates_merged_budget() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);
        let patch = BountyPatch {
            budget_min: Some(2500),
            ..Default::default()
        };
        let err = bounty
            .apply_patch(poster, patch, &BountyLimits::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
        assert_eq!(bounty.budget_min, 500);
    }

    #[test]
    fn test_patch_clears_nullable_fields() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);
        bounty.category = Some(Category::Web);

        let patch = BountyPatch::parse(BountyPatchInput {
            category: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.category, Some(None));

        bounty
            .apply_patch(poster, patch, &BountyLimits::default(), Utc::now())
            .unwrap();
        assert_eq!(bounty.category, None);
    }

    #[test]
    fn test_patch_status_rules() {
        let poster = UserId::new();
        let limits = BountyLimits::default();
        let mut bounty = open_bounty(poster);

        let to = |s: BountyStatus| BountyPatch {
            status: Some(s),
            ..Default::default()
        };

        assert!(matches!(
            bounty.apply_patch(poster, to(BountyStatus::Awarded), &limits, Utc::now()),
            Err(MarketError::InvalidTransition { .. })
        ));
        assert!(matches!(
            bounty.apply_patch(poster, to(BountyStatus::Draft), &limits, Utc::now()),
            Err(MarketError::InvalidTransition { .. })
        ));

        bounty
            .apply_patch(poster, to(BountyStatus::InReview), &limits, Utc::now())
            .unwrap();
        assert_eq!(bounty.status, BountyStatus::InReview);

        bounty.cancel(poster, Utc::now()).unwrap();
        assert!(matches!(
            bounty.apply_patch(poster, to(BountyStatus::Open), &limits, Utc::now()),
            Err(MarketError::BountyFinalized { .. })
        ));
    }

    #[test]
    fn test_max_submissions_not_below_count() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);
        bounty.accept_submission(false, Utc::now()).unwrap();
        bounty.accept_submission(false, Utc::now()).unwrap();

        let patch = BountyPatch {
            max_submissions: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            bounty.apply_patch(poster, patch, &BountyLimits::default(), Utc::now()),
            Err(MarketError::Validation(_))
        ));
    }

    #[test]
    fn test_accept_submission_gates() {
        let mut bounty = open_bounty(UserId::new());

        assert!(matches!(
            bounty.accept_submission(true, Utc::now()),
            Err(MarketError::DuplicateSubmission)
        ));
        bounty.accept_submission(false, Utc::now()).unwrap();
        bounty.accept_submission(false, Utc::now()).unwrap();
        assert_eq!(bounty.submission_count, 2);
        assert!(matches!(
            bounty.accept_submission(false, Utc::now()),
            Err(MarketError::MaxSubmissionsReached)
        ));
        assert_eq!(bounty.submission_count, 2);

        let mut closed = open_bounty(bounty.poster_id);
        closed.status = BountyStatus::InReview;
        assert!(matches!(
            closed.accept_submission(false, Utc::now()),
            Err(MarketError::BountyNotOpen { .. })
        ));
    }

    #[test]
    fn test_cancel_rules() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);

        assert!(matches!(
            bounty.cancel(UserId::new(), Utc::now()),
            Err(MarketError::Forbidden)
        ));
        bounty.cancel(poster, Utc::now()).unwrap();
        assert!(matches!(
            bounty.cancel(poster, Utc::now()),
            Err(MarketError::InvalidTransition { .. })
        ));

        let mut awarded = open_bounty(poster);
        awarded.status = BountyStatus::Awarded;
        assert!(matches!(
            awarded.cancel(poster, Utc::now()),
            Err(MarketError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_authorize_award() {
        let poster = UserId::new();
        let mut bounty = open_bounty(poster);

        assert!(matches!(
            bounty.authorize_award(UserId::new()),
            Err(MarketError::Forbidden)
        ));
        assert!(bounty.authorize_award(poster).is_ok());

        bounty.status = BountyStatus::Expired;
        assert!(bounty.authorize_award(poster).is_ok());

        bounty.status = BountyStatus::Awarded;
        assert!(matches!(
            bounty.authorize_award(poster),
            Err(MarketError::AlreadyAwarded)
        ));

        bounty.status = BountyStatus::Cancelled;
        assert!(matches!(
            bounty.authorize_award(poster),
            Err(MarketError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_expire_if_overdue() {
        let now = Utc::now();
        let mut bounty = open_bounty(UserId::new());
        assert!(!bounty.expire_if_overdue(now));

        bounty.deadline = Some(now - Duration::hours(1));
        assert!(bounty.expire_if_overdue(now));
        assert_eq!(bounty.status, BountyStatus::Expired);
        assert!(!bounty.expire_if_overdue(now));
    }

    #[test]
    fn test_overdue_bounty_refuses_submissions() {
        let now = Utc::now();
        let mut bounty = open_bounty(UserId::new());
        bounty.deadline = Some(now - Duration::minutes(5));

        let err = bounty.accept_submission(false, now).unwrap_err();
        assert!(matches!(err, MarketError::BountyNotOpen { ref status } if status == "expired"));
        assert_eq!(bounty.submission_count, 0);

        bounty.deadline = Some(now + Duration::days(1));
        bounty.accept_submission(false, now).unwrap();
        assert_eq!(bounty.submission_count, 1);
    }
}
