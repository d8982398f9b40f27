use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role
///
/// `Both` is the sign-up default. `Admin` exists in storage but can never be
/// picked through sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Poster,
    Builder,
    #[default]
    Both,
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Poster => "poster",
            Builder => "builder",
            Both => "both",
            Admin => "admin",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "poster" => Some(Poster),
            "builder" => Some(Builder),
            "both" => Some(Both),
            "admin" => Some(Admin),
            _ => None,
        }
    }

    /// Parse a role chosen by the user at sign-up
    pub fn self_selectable(code: Option<&str>) -> AppResult<Self> {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            None => Ok(Self::default()),
            Some(code) => match Self::from_code(code) {
                Some(UserRole::Admin) | None => Err(AppError::bad_request(
                    "Role must be one of: poster, builder, both",
                )),
                Some(role) => Ok(role),
            },
        }
    }

    #[inline]
    pub const fn can_post(&self) -> bool {
        matches!(self, UserRole::Poster | UserRole::Both | UserRole::Admin)
    }

    #[inline]
    pub const fn can_build(&self) -> bool {
        matches!(self, UserRole::Builder | UserRole::Both | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_codes_round_trip() {
        for role in [
            UserRole::Poster,
            UserRole::Builder,
            UserRole::Both,
            UserRole::Admin,
        ] {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
        assert_eq!(UserRole::from_code("super_admin"), None);
    }

    #[test]
    fn test_self_selectable() {
        assert_eq!(UserRole::self_selectable(None).unwrap(), UserRole::Both);
        assert_eq!(UserRole::self_selectable(Some("")).unwrap(), UserRole::Both);
        assert_eq!(
            UserRole::self_selectable(Some("builder")).unwrap(),
            UserRole::Builder
        );
        assert!(UserRole::self_selectable(Some("admin")).is_err());
        assert!(UserRole::self_selectable(Some("owner")).is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(UserRole::Poster.can_post());
        assert!(!UserRole::Poster.can_build());
        assert!(UserRole::Builder.can_build());
        assert!(!UserRole::Builder.can_post());
        assert!(UserRole::Both.can_post() && UserRole::Both.can_build());
    }
}
