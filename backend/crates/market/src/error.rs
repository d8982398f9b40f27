//! Market Error Types
//!
//! Market-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Market-specific result type alias
pub type MarketResult<T> = Result<T, MarketError>;

/// Market-specific error variants
#[derive(Debug, Error)]
pub enum MarketError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Update request carried no allow-listed field
    #[error("No updatable fields supplied")]
    NoOp,

    /// Bounty is at its submission cap
    #[error("Max submissions reached")]
    MaxSubmissionsReached,

    /// Bounty is not open for submissions
    #[error("Bounty is not accepting submissions (status: {status})")]
    BountyNotOpen { status: String },

    /// Awarded and cancelled bounties are read-only
    #[error("Bounty is {status} and can no longer be changed")]
    BountyFinalized { status: String },

    /// Caller does not own the entity
    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Bounty not found")]
    BountyNotFound,

    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// One submission per builder per bounty
    #[error("You have already submitted to this bounty")]
    DuplicateSubmission,

    #[error("Bounty has already been awarded")]
    AlreadyAwarded,

    /// State machine rule violated
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        MarketError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MarketError::Validation(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::Validation(_) | MarketError::NoOp | MarketError::MaxSubmissionsReached => {
                ErrorKind::BadRequest
            }
            MarketError::Forbidden => ErrorKind::Forbidden,
            MarketError::BountyNotFound
            | MarketError::SubmissionNotFound
            | MarketError::CommentNotFound => ErrorKind::NotFound,
            MarketError::DuplicateSubmission
            | MarketError::AlreadyAwarded
            | MarketError::BountyNotOpen { .. }
            | MarketError::BountyFinalized { .. }
            | MarketError::InvalidTransition { .. } => ErrorKind::Conflict,
            MarketError::Database(e) => AppError::from(e).kind(),
            MarketError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError; storage failures are classified by SQLSTATE
    /// and their detail stays in the logs
    pub fn to_app_error(&self) -> AppError {
        match self {
            MarketError::Database(e) => AppError::from(e),
            MarketError::Internal(_) => AppError::internal("Internal server error"),
            MarketError::NoOp => AppError::bad_request(self.to_string())
                .with_action("Send at least one updatable field"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            MarketError::Database(e) => {
                tracing::error!(error = %e, "Market database error");
            }
            MarketError::Internal(msg) => {
                tracing::error!(message = %msg, "Market internal error");
            }
            MarketError::Forbidden => {
                tracing::warn!("Ownership check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Market error");
            }
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<kernel::id::IdParseError> for MarketError {
    fn from(err: kernel::id::IdParseError) -> Self {
        MarketError::Validation(err.to_string())
    }
}
