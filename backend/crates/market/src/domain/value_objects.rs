//! Value Objects
//!
//! Closed enumerations stored as lower-case text, plus validated scalar
//! wrappers. Parsing failures are `MarketError::Validation`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MarketError, MarketResult};

/// Generates `code` / `from_code` / `parse` / `Display` for a text-backed enum
macro_rules! text_enum {
    ($name:ident, $label:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub const fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            #[inline]
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Parse client input
            pub fn parse(code: &str) -> MarketResult<Self> {
                Self::from_code(code.trim()).ok_or_else(|| {
                    let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.code()).collect();
                    MarketError::validation(format!(
                        "Invalid {}: must be one of {}",
                        $label,
                        allowed.join(", ")
                    ))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

// ============================================================================
// Bounty Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BountyStatus {
    Draft,
    #[default]
    Open,
    InReview,
    Awarded,
    Cancelled,
    Expired,
}

text_enum!(BountyStatus, "status", {
    Draft => "draft",
    Open => "open",
    InReview => "in_review",
    Awarded => "awarded",
    Cancelled => "cancelled",
    Expired => "expired",
});

impl BountyStatus {
    /// Allowed edges of the bounty state machine
    pub const fn can_transition_to(&self, to: BountyStatus) -> bool {
        use BountyStatus::*;
        matches!(
            (self, to),
            (Draft, Open | Cancelled)
                | (Open, InReview | Awarded | Cancelled | Expired)
                | (InReview, Awarded | Cancelled | Expired)
                | (Expired, Awarded | Cancelled)
        )
    }

    /// No outgoing edges
    pub const fn is_final(&self) -> bool {
        matches!(self, BountyStatus::Awarded | BountyStatus::Cancelled)
    }

    /// Subject to the deadline sweep
    pub const fn is_running(&self) -> bool {
        matches!(self, BountyStatus::Open | BountyStatus::InReview)
    }
}

// ============================================================================
// Submission Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Deploying,
    Live,
    Failed,
    Withdrawn,
    Winner,
    Rejected,
}

text_enum!(SubmissionStatus, "submission status", {
    Pending => "pending",
    Deploying => "deploying",
    Live => "live",
    Failed => "failed",
    Withdrawn => "withdrawn",
    Winner => "winner",
    Rejected => "rejected",
});

impl SubmissionStatus {
    /// Allowed edges of the submission state machine.
    /// `live -> live` is a redeploy.
    pub const fn can_transition_to(&self, to: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, to),
            (
                Pending,
                Deploying | Live | Failed | Withdrawn | Winner | Rejected
            ) | (Deploying, Live | Failed | Withdrawn)
                | (Failed, Deploying | Live | Withdrawn)
                | (Live, Live | Winner | Rejected | Withdrawn)
        )
    }

    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Winner | SubmissionStatus::Rejected | SubmissionStatus::Withdrawn
        )
    }
}

// ============================================================================
// Category / Difficulty / Visibility
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Web,
    Mobile,
    Api,
    AiMl,
    Data,
    Devops,
    Design,
    Blockchain,
    Other,
}

text_enum!(Category, "category", {
    Web => "web",
    Mobile => "mobile",
    Api => "api",
    AiMl => "ai_ml",
    Data => "data",
    Devops => "devops",
    Design => "design",
    Blockchain => "blockchain",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

text_enum!(Difficulty, "difficulty", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
    Expert => "expert",
});

/// `Private` bounties are unlisted: reachable by id, absent from browse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

text_enum!(Visibility, "visibility", {
    Public => "public",
    Private => "private",
});

// ============================================================================
// Budget
// ============================================================================

/// Whole currency units, `0 <= min <= max <= ceiling`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    min: i64,
    max: i64,
}

impl Budget {
    pub fn new(min: i64, max: i64, ceiling: i64) -> MarketResult<Self> {
        if min < 0 {
            return Err(MarketError::validation("budgetMin must be at least 0"));
        }
        if max < min {
            return Err(MarketError::validation(
                "budgetMax must be greater than or equal to budgetMin",
            ));
        }
        if max > ceiling {
            return Err(MarketError::validation(format!(
                "budgetMax must be at most {ceiling}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }
}

// ============================================================================
// Score
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(i16);

impl Score {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 10;

    pub fn new(value: i64) -> MarketResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(MarketError::validation(
                "Score must be an integer between 1 and 10",
            ));
        }
        Ok(Self(value as i16))
    }

    /// Accepts only JSON integers (`7`, not `7.5` or `"7"`)
    pub fn from_json(value: &serde_json::Value) -> MarketResult<Self> {
        match value.as_i64() {
            Some(n) => Self::new(n),
            None => Err(MarketError::validation(
                "Score must be an integer between 1 and 10",
            )),
        }
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

// ============================================================================
// Web URL
// ============================================================================

/// Absolute http(s) URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebUrl(String);

impl WebUrl {
    pub fn parse(field: &str, raw: &str) -> MarketResult<Self> {
        let raw = raw.trim();
        let parsed = url::Url::parse(raw)
            .map_err(|_| MarketError::validation(format!("{field} must be a valid URL")))?;

        match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(Self(raw.to_string())),
            _ => Err(MarketError::validation(format!(
                "{field} must be an http(s) URL"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// ============================================================================
// Deadline
// ============================================================================

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` meaning the end of that day (UTC)
pub fn parse_deadline(raw: &str) -> MarketResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
        return Ok(date.and_time(end_of_day).and_utc());
    }

    Err(MarketError::validation(
        "deadline must be a valid date (YYYY-MM-DD or RFC 3339)",
    ))
}

// ============================================================================
// Text and list fields
// ============================================================================

pub const TITLE_MAX: usize = 200;
pub const BRIEF_MAX: usize = 5_000;
pub const DETAILED_SPEC_MAX: usize = 50_000;
pub const DESCRIPTION_MAX: usize = 10_000;
pub const FEEDBACK_MAX: usize = 5_000;
pub const COMMENT_MAX: usize = 5_000;
pub const TAGS_MAX_ITEMS: usize = 20;
pub const TAG_MAX: usize = 50;

/// Trimmed, non-empty, bounded
pub fn required_text(field: &str, raw: &str, max: usize) -> MarketResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(MarketError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(MarketError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Blank collapses to `None`
pub fn optional_text(field: &str, raw: Option<&str>, max: usize) -> MarketResult<Option<String>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => required_text(field, value, max).map(Some),
    }
}

/// Trimmed, de-duplicated (first occurrence wins), blanks dropped
pub fn tag_list(field: &str, raw: &[String]) -> MarketResult<Vec<String>> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if tag.chars().count() > TAG_MAX {
            return Err(MarketError::validation(format!(
                "{field} entries must be at most {TAG_MAX} characters"
            )));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.len() > TAGS_MAX_ITEMS {
        return Err(MarketError::validation(format!(
            "{field} may contain at most {TAGS_MAX_ITEMS} entries"
        )));
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounty_transitions() {
        use BountyStatus::*;
        assert!(Draft.can_transition_to(Open));
        assert!(Open.can_transition_to(Cancelled));
        assert!(Open.can_transition_to(Awarded));
        assert!(InReview.can_transition_to(Expired));
        assert!(Expired.can_transition_to(Awarded));

        assert!(!Open.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Awarded));
        assert!(!Expired.can_transition_to(Open));
        for to in BountyStatus::ALL {
            assert!(!Awarded.can_transition_to(*to), "awarded -> {to}");
            assert!(!Cancelled.can_transition_to(*to), "cancelled -> {to}");
        }
    }

    #[test]
    fn test_submission_transitions() {
        use SubmissionStatus::*;
        assert!(Pending.can_transition_to(Live));
        assert!(Pending.can_transition_to(Winner));
        assert!(Live.can_transition_to(Winner));
        assert!(Live.can_transition_to(Live));
        assert!(Failed.can_transition_to(Deploying));
        assert!(!Deploying.can_transition_to(Winner));
        for from in [Winner, Rejected, Withdrawn] {
            assert!(from.is_final());
            for to in SubmissionStatus::ALL {
                assert!(!from.can_transition_to(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for status in BountyStatus::ALL {
            assert_eq!(BountyStatus::from_code(status.code()), Some(*status));
        }
        for category in Category::ALL {
            assert_eq!(Category::parse(category.code()).unwrap(), *category);
        }
        assert_eq!(
            serde_json::to_string(&BountyStatus::InReview).unwrap(),
            r#""in_review""#
        );
        assert_eq!(Category::AiMl.code(), "ai_ml");
    }

    #[test]
    fn test_enum_parse_errors_list_choices() {
        let err = Difficulty::parse("legendary").unwrap_err();
        assert!(err.to_string().contains("beginner, intermediate, advanced, expert"));
        assert!(Category::parse("WEB").is_err());
        assert_eq!(Visibility::parse(" private ").unwrap(), Visibility::Private);
    }

    #[test]
    fn test_budget_rules() {
        assert!(Budget::new(0, 0, 1_000_000).is_ok());
        assert!(Budget::new(500, 2000, 1_000_000).is_ok());
        assert!(Budget::new(-1, 10, 1_000_000).is_err());
        assert!(Budget::new(100, 99, 1_000_000).is_err());
        assert!(Budget::new(0, 1_000_000, 1_000_000).is_ok());
        assert!(Budget::new(0, 1_000_001, 1_000_000).is_err());
    }

    #[test]
    fn test_score_range() {
        assert!(Score::new(0).is_err());
        assert_eq!(Score::new(1).unwrap().value(), 1);
        assert_eq!(Score::new(10).unwrap().value(), 10);
        assert!(Score::new(11).is_err());

        assert!(Score::from_json(&serde_json::json!(7)).is_ok());
        assert!(Score::from_json(&serde_json::json!(7.5)).is_err());
        assert!(Score::from_json(&serde_json::json!("7")).is_err());
    }

    #[test]
    fn test_web_url() {
        assert!(WebUrl::parse("repoUrl", "https://github.com/a/b").is_ok());
        assert!(WebUrl::parse("repoUrl", "http://localhost:3000/x").is_ok());
        assert!(WebUrl::parse("repoUrl", "ftp://example.com/file").is_err());
        assert!(WebUrl::parse("repoUrl", "javascript:alert(1)").is_err());
        assert!(WebUrl::parse("repoUrl", "not a url").is_err());
        assert!(WebUrl::parse("repoUrl", "/relative/path").is_err());
    }

    #[test]
    fn test_parse_deadline() {
        let day = parse_deadline("2030-06-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2030-06-01T23:59:59+00:00");

        let ts = parse_deadline("2030-06-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2030-06-01T10:00:00+00:00");

        assert!(parse_deadline("2030-02-30").is_err());
        assert!(parse_deadline("next friday").is_err());
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(required_text("title", "  Hi ", 10).unwrap(), "Hi");
        assert!(required_text("title", "   ", 10).is_err());
        assert!(required_text("title", "abcdefghijk", 10).is_err());
        assert_eq!(optional_text("detailedSpec", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("detailedSpec", None, 10).unwrap(), None);
    }

    #[test]
    fn test_tag_list_normalizes() {
        let raw = vec![" rust ".into(), "".into(), "axum".into(), "rust".into()];
        assert_eq!(tag_list("tags", &raw).unwrap(), vec!["rust", "axum"]);

        let too_many: Vec<String> = (0..=TAGS_MAX_ITEMS).map(|i| format!("t{i}")).collect();
        assert!(tag_list("tags", &too_many).is_err());
        assert!(tag_list("tags", &["x".repeat(TAG_MAX + 1)]).is_err());
    }
}
