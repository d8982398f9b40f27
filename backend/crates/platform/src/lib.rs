//! Platform Crate - Technical Infrastructure
//!
//! - Cryptographic helpers (SHA-256, hex, base64url, constant-time compare)
//! - Password hashing (PBKDF2-HMAC-SHA256, legacy SHA-256 verification)
//! - Session bearer tokens

pub mod crypto;
pub mod password;
pub mod token;
