//! Password Hashing and Verification
//!
//! Stored format: `hex(salt):hex(key)` where `key` is PBKDF2-HMAC-SHA256
//! over the password bytes with a 16-byte random salt, 100,000 iterations,
//! 32-byte output.
//!
//! A stored value without `:` is a legacy unsalted SHA-256 hex digest. Those
//! still verify, but nothing in this module produces them; callers are
//! expected to re-hash on the next successful login (see [`HashedPassword::is_legacy`]).

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{constant_time_eq, from_hex, random_bytes, sha256, to_hex};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

const SEPARATOR: char = ':';

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors (sign-up / password change only)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    #[error("Salt must not be empty")]
    EmptySalt,

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Not `Clone`; `Debug` is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate a new password against the sign-up policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        if raw.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = raw.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if raw
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(raw))
    }

    /// Wrap a login attempt without applying the policy
    ///
    /// Accounts created before the policy existed must still be able to log in.
    pub fn for_verification(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash with the given salt, or a fresh random one
    pub fn hash(&self, salt: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let salt = match salt {
            Some([]) => return Err(PasswordHashError::EmptySalt),
            Some(s) => s.to_vec(),
            None => random_bytes(SALT_LEN),
        };

        let key = derive_key(self.as_bytes(), &salt, PBKDF2_ITERATIONS);

        Ok(HashedPassword::Salted { salt, key })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// A stored credential hash
#[derive(Clone, PartialEq, Eq)]
pub enum HashedPassword {
    /// `hex(salt):hex(pbkdf2 key)`
    Salted { salt: Vec<u8>, key: [u8; KEY_LEN] },
    /// Read-only compatibility: bare SHA-256 hex digest
    LegacySha256 { digest: [u8; 32] },
}

impl HashedPassword {
    /// Parse a value read from the credential store
    pub fn from_stored(stored: &str) -> Result<Self, PasswordHashError> {
        match stored.split_once(SEPARATOR) {
            Some((salt_hex, key_hex)) => {
                let salt = from_hex(salt_hex).map_err(|_| PasswordHashError::InvalidHashFormat)?;
                if salt.is_empty() {
                    return Err(PasswordHashError::InvalidHashFormat);
                }
                let key: [u8; KEY_LEN] = from_hex(key_hex)
                    .map_err(|_| PasswordHashError::InvalidHashFormat)?
                    .try_into()
                    .map_err(|_| PasswordHashError::InvalidHashFormat)?;
                Ok(Self::Salted { salt, key })
            }
            None => {
                let digest: [u8; 32] = from_hex(stored.trim())
                    .map_err(|_| PasswordHashError::InvalidHashFormat)?
                    .try_into()
                    .map_err(|_| PasswordHashError::InvalidHashFormat)?;
                Ok(Self::LegacySha256 { digest })
            }
        }
    }

    /// Serialize for the credential store
    pub fn to_stored(&self) -> String {
        match self {
            Self::Salted { salt, key } => format!("{}{}{}", to_hex(salt), SEPARATOR, to_hex(key)),
            Self::LegacySha256 { digest } => to_hex(digest),
        }
    }

    /// Constant-time verification
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        match self {
            Self::Salted { salt, key } => {
                let candidate = derive_key(password.as_bytes(), salt, PBKDF2_ITERATIONS);
                constant_time_eq(&candidate, key)
            }
            Self::LegacySha256 { digest } => {
                constant_time_eq(&sha256(password.as_bytes()), digest)
            }
        }
    }

    /// Legacy digests should be replaced after the next successful login
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacySha256 { .. })
    }
}

/// Verify directly against a stored string; corrupt values never match.
pub fn verify_stored(password: &ClearTextPassword, stored: &str) -> bool {
    HashedPassword::from_stored(stored)
        .map(|hashed| hashed.verify(password))
        .unwrap_or(false)
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.is_legacy() { "sha256" } else { "pbkdf2" };
        f.debug_struct("HashedPassword")
            .field("scheme", &scheme)
            .field("hash", &"[HASH]")
            .finish()
    }
}

fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::for_verification(s.to_string())
    }

    #[test]
    fn test_policy_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_policy_too_long() {
        let result = ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1));
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_policy_whitespace_only() {
        let result = ClearTextPassword::new("          ".to_string());
        assert_eq!(result.unwrap_err(), PasswordPolicyError::EmptyOrWhitespace);
    }

    #[test]
    fn test_policy_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}defgh".to_string());
        assert_eq!(result.unwrap_err(), PasswordPolicyError::InvalidCharacter);
    }

    #[test]
    fn test_pbkdf2_rfc_vector() {
        // RFC 7914 section 11 (PBKDF2-HMAC-SHA256, c = 1)
        let key = derive_key(b"password", b"salt", 1);
        assert_eq!(
            to_hex(&key),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn test_hash_format() {
        let hashed = pw("correct horse battery").hash(None).unwrap();
        let stored = hashed.to_stored();
        let (salt_hex, key_hex) = stored.split_once(':').unwrap();
        assert_eq!(salt_hex.len(), SALT_LEN * 2);
        assert_eq!(key_hex.len(), KEY_LEN * 2);
        assert!(!hashed.is_legacy());
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let password = pw("correct horse battery");
        let stored = password.hash(None).unwrap().to_stored();

        assert!(verify_stored(&password, &stored));
        assert!(!verify_stored(&pw("correct horse battery!"), &stored));
    }

    #[test]
    fn test_explicit_salt_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = pw("s3cret-value").hash(Some(&salt)).unwrap();
        let b = pw("s3cret-value").hash(Some(&salt)).unwrap();
        assert_eq!(a.to_stored(), b.to_stored());
        assert!(pw("x").hash(Some(&[])).is_err());
    }

    #[test]
    fn test_random_salts_differ() {
        let a = pw("same password").hash(None).unwrap().to_stored();
        let b = pw("same password").hash(None).unwrap().to_stored();
        assert_ne!(a, b);
    }

    #[test]
    fn test_legacy_digest_still_verifies() {
        let legacy = to_hex(&sha256(b"old-password"));
        let hashed = HashedPassword::from_stored(&legacy).unwrap();

        assert!(hashed.is_legacy());
        assert!(hashed.verify(&pw("old-password")));
        assert!(!hashed.verify(&pw("old-password2")));
        assert!(verify_stored(&pw("old-password"), &legacy.to_uppercase()));
    }

    #[test]
    fn test_corrupt_values_never_match() {
        for stored in ["", ":", "zz:zz", "abcd", "00:1234", "not hex at all", ":abcd"] {
            assert!(!verify_stored(&pw("anything"), stored), "{stored}");
        }
    }

    #[test]
    fn test_debug_redaction() {
        let password = pw("super-secret");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("super-secret"));
    }
}
