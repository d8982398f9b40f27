//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// 30 days
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Fixed lifetime of a bearer token; never extended
    pub session_ttl: Duration,
    /// Re-hash legacy unsalted digests after a successful login
    pub upgrade_legacy_hashes: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            upgrade_legacy_hashes: true,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::days(30))
    }
}
