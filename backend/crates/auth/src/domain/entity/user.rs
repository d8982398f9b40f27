//! User Entity
//!
//! Profile plus marketplace aggregates. Credentials live in [`Credential`]
//! so password hashes never travel with the profile.
//!
//! [`Credential`]: super::credential::Credential

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{display_name::DisplayName, email::Email, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: DisplayName,
    pub role: UserRole,
    /// +100 per award won
    pub reputation: i64,
    /// Sum of awarded amounts received as builder
    pub total_earned: i64,
    /// Sum of awarded amounts paid out as poster
    pub total_posted: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: Email, name: DisplayName, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::new(),
            email,
            name,
            role,
            reputation: 0,
            total_earned: 0,
            total_posted: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
