//! Submission Entity

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, SubmissionId, UserId};

use crate::domain::value_objects::{
    DESCRIPTION_MAX, FEEDBACK_MAX, Score, SubmissionStatus, TITLE_MAX, WebUrl, optional_text,
    required_text, tag_list,
};
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub bounty_id: BountyId,
    pub builder_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    /// Always set; defaults to the hosted preview path
    pub preview_url: String,
    pub tech_used: Vec<String>,
    pub status: SubmissionStatus,
    pub score: Option<i16>,
    pub feedback: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated create request
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub title: String,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub preview_url: Option<String>,
    pub tech_used: Vec<String>,
}

fn optional_url(field: &str, raw: Option<&str>) -> MarketResult<Option<String>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| WebUrl::parse(field, s).map(WebUrl::into_string))
        .transpose()
}

impl Submission {
    /// Build a pending submission. The id is fixed here so the default
    /// preview URL can embed it.
    pub fn create(
        bounty_id: BountyId,
        builder_id: UserId,
        input: NewSubmission,
        preview_base_url: &str,
        now: DateTime<Utc>,
    ) -> MarketResult<Self> {
        let id = SubmissionId::new();
        let title = required_text("title", &input.title, TITLE_MAX)?;
        let description =
            optional_text("description", input.description.as_deref(), DESCRIPTION_MAX)?;
        let repo_url = optional_url("repoUrl", input.repo_url.as_deref())?;
        let preview_url = match optional_url("previewUrl", input.preview_url.as_deref())? {
            Some(url) => url,
            None => format!("{}/{}/", preview_base_url.trim_end_matches('/'), id),
        };

        Ok(Self {
            id,
            bounty_id,
            builder_id,
            title,
            description,
            repo_url,
            preview_url,
            tech_used: tag_list("techUsed", &input.tech_used)?,
            status: SubmissionStatus::Pending,
            score: None,
            feedback: None,
            reviewed_at: None,
            deployed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn ensure_builder(&self, caller: UserId) -> MarketResult<()> {
        if self.builder_id == caller {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }

    fn transition(&mut self, to: SubmissionStatus) -> MarketResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(MarketError::invalid_transition(self.status, to));
        }
        self.status = to;
        Ok(())
    }

    /// Builder edit of allow-listed fields
    pub fn apply_patch(
        &mut self,
        caller: UserId,
        patch: SubmissionPatch,
        now: DateTime<Utc>,
    ) -> MarketResult<()> {
        self.ensure_builder(caller)?;
        if patch.is_empty() {
            return Err(MarketError::NoOp);
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(repo_url) = patch.repo_url {
            self.repo_url = repo_url;
        }
        if let Some(preview_url) = patch.preview_url {
            self.preview_url = preview_url;
        }
        if let Some(tech_used) = patch.tech_used {
            self.tech_used = tech_used;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Poster review; ownership of the bounty is checked by the caller
    pub fn record_review(&mut self, score: Score, feedback: Option<String>, now: DateTime<Utc>) {
        self.score = Some(score.value());
        self.feedback = feedback;
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }

    /// Preview deployment finished
    pub fn mark_live(&mut self, caller: UserId, now: DateTime<Utc>) -> MarketResult<()> {
        self.ensure_builder(caller)?;
        self.transition(SubmissionStatus::Live)?;
        self.deployed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Only reachable from the award transaction
    pub(crate) fn mark_winner(&mut self, now: DateTime<Utc>) -> MarketResult<()> {
        self.transition(SubmissionStatus::Winner)?;
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Validate review feedback
pub fn review_feedback(raw: Option<&str>) -> MarketResult<Option<String>> {
    optional_text("feedback", raw, FEEDBACK_MAX)
}

// ============================================================================
// Patch
// ============================================================================

/// Unvalidated update request; empty strings clear nullable fields
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatchInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub preview_url: Option<String>,
    pub tech_used: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub repo_url: Option<Option<String>>,
    pub preview_url: Option<String>,
    pub tech_used: Option<Vec<String>>,
}

impl SubmissionPatch {
    pub fn parse(input: SubmissionPatchInput) -> MarketResult<Self> {
        Ok(Self {
            title: input
                .title
                .as_deref()
                .map(|t| required_text("title", t, TITLE_MAX))
                .transpose()?,
            description: input
                .description
                .as_deref()
                .map(|d| optional_text("description", Some(d), DESCRIPTION_MAX))
                .transpose()?,
            repo_url: input
                .repo_url
                .as_deref()
                .map(|u| optional_url("repoUrl", Some(u)))
                .transpose()?,
            preview_url: input
                .preview_url
                .as_deref()
                .map(|u| WebUrl::parse("previewUrl", u).map(WebUrl::into_string))
                .transpose()?,
            tech_used: input
                .tech_used
                .as_deref()
                .map(|t| tag_list("techUsed", t))
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
