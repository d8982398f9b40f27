//! Session Bearer Tokens
//!
//! The raw token is handed to the client once. Only its SHA-256 digest is
//! stored, so a leaked sessions table cannot be replayed.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{random_bytes, sha256, to_base64_url, to_hex};

/// 256 bits of entropy
pub const TOKEN_BYTES: usize = 32;

/// Opaque bearer token (base64url, no padding)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(to_base64_url(&random_bytes(TOKEN_BYTES)))
    }

    /// Wrap a token presented by a client
    pub fn from_presented(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this token: lower-case hex SHA-256
    pub fn digest(&self) -> String {
        to_hex(&sha256(self.0.as_bytes()))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_url_safe_and_unique() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();

        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(a.as_str().len(), 43);
        assert!(
            a.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let token = SessionToken::from_presented("abc");
        assert_eq!(
            token.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(token.digest(), SessionToken::from_presented("abc").digest());
    }

    #[test]
    fn test_debug_redacted() {
        let token = SessionToken::from_presented("secret-token");
        assert!(!format!("{token:?}").contains("secret-token"));
    }
}
