//! User Password Value Object
//!
//! Domain wrapper around `platform::password`. Sign-up passwords go through
//! the policy; login attempts are wrapped as-is so accounts created under an
//! older policy can still authenticate.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a new password (sign-up)
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                AppError::bad_request(format!("Password must be at least {min} characters"))
                    .with_action("Please choose a longer password")
            }
            PasswordPolicyError::TooLong { max, .. } => {
                AppError::bad_request(format!("Password must be at most {max} characters"))
            }
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password is required")
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a login attempt without the policy check
    pub fn attempt(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored credential hash (`salt:key`, or a legacy bare digest)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash with a fresh random salt
    pub fn from_raw(raw: &RawPassword) -> AppResult<Self> {
        let hashed = raw.inner().hash(None).map_err(|e| match e {
            PasswordHashError::EmptySalt | PasswordHashError::InvalidHashFormat => {
                AppError::internal("Password hashing failed")
            }
        })?;

        Ok(Self(hashed))
    }

    /// Parse the `password_hash` column
    pub fn from_stored(stored: &str) -> AppResult<Self> {
        HashedPassword::from_stored(stored)
            .map(Self)
            .map_err(|_| AppError::internal("Invalid password hash in database"))
    }

    pub fn to_stored(&self) -> String {
        self.0.to_stored()
    }

    /// Constant-time verification
    pub fn verify(&self, raw: &RawPassword) -> bool {
        self.0.verify(raw.inner())
    }

    /// Unsalted digests are accepted but should be replaced
    pub fn needs_rehash(&self) -> bool {
        self.0.is_legacy()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("legacy", &self.needs_rehash())
            .field("hash", &"[HASH]")
            .finish()
    }
}
