//! Display Name Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DISPLAY_NAME_MAX_LENGTH: usize = 100;

/// Human-readable name shown on bounties, submissions and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }
        if name.chars().count() > DISPLAY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {DISPLAY_NAME_MAX_LENGTH} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AppError::bad_request("Name contains invalid characters"));
        }

        Ok(Self(name))
    }

    /// Fallback for external sign-in when the provider sends no name
    pub fn from_email_local_part(email: &str) -> Self {
        let local = email.split('@').next().unwrap_or_default();
        let name: String = local.chars().take(DISPLAY_NAME_MAX_LENGTH).collect();
        if name.is_empty() {
            Self("user".to_string())
        } else {
            Self(name)
        }
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trimmed() {
        assert_eq!(DisplayName::new("  Ada  ").unwrap().as_str(), "Ada");
    }

    #[test]
    fn test_display_name_length() {
        assert!(DisplayName::new("").is_err());
        assert!(DisplayName::new("x".repeat(DISPLAY_NAME_MAX_LENGTH)).is_ok());
        assert!(DisplayName::new("x".repeat(DISPLAY_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(
            DisplayName::from_email_local_part("grace@example.com").as_str(),
            "grace"
        );
        assert_eq!(DisplayName::from_email_local_part("@x.io").as_str(), "user");
    }
}
