//! Auth Session Entity
//!
//! The row is keyed by the SHA-256 digest of the bearer token; the raw token
//! only exists on the client. Sessions expire passively: nothing deletes or
//! extends them.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::token::SessionToken;

#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Hex SHA-256 of the bearer token
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of looking a token up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLookup {
    Valid(UserId),
    Expired,
    NotFound,
}

impl SessionLookup {
    /// Expired and unknown tokens are indistinguishable to callers
    pub fn user_id(self) -> Option<UserId> {
        match self {
            SessionLookup::Valid(user_id) => Some(user_id),
            SessionLookup::Expired | SessionLookup::NotFound => None,
        }
    }
}

impl AuthSession {
    /// Mint a token and the session row that references it
    pub fn issue(user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> (SessionToken, Self) {
        let token = SessionToken::generate();
        let session = Self {
            id: token.digest(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        };
        (token, session)
    }

    /// Valid while `expires_at > now`
    pub fn lookup_at(&self, now: DateTime<Utc>) -> SessionLookup {
        if self.expires_at > now {
            SessionLookup::Valid(self.user_id)
        } else {
            SessionLookup::Expired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_keys_row_by_token_digest() {
        let now = Utc::now();
        let (token, session) = AuthSession::issue(UserId::new(), Duration::days(30), now);

        assert_eq!(session.id, token.digest());
        assert_ne!(session.id, token.as_str());
        assert_eq!(session.expires_at - session.created_at, Duration::days(30));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let user_id = UserId::new();
        let (_, session) = AuthSession::issue(user_id, Duration::days(30), now);

        let just_before = session.expires_at - Duration::seconds(1);
        let just_after = session.expires_at + Duration::seconds(1);

        assert_eq!(session.lookup_at(just_before), SessionLookup::Valid(user_id));
        assert_eq!(session.lookup_at(session.expires_at), SessionLookup::Expired);
        assert_eq!(session.lookup_at(just_after), SessionLookup::Expired);
        assert_eq!(session.lookup_at(just_after).user_id(), None);
    }
}
