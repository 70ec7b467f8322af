//! User roles reported by the backend.

use serde::{Deserialize, Serialize};

/// Permission level of an authenticated user.
///
/// The backend sends roles as lowercase strings. Anything that is not
/// `admin` is treated as a regular customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// May use the dashboard (product and category management).
    Admin,
    /// Regular shopper.
    #[default]
    #[serde(other)]
    User,
}

impl UserRole {
    /// Whether this role grants dashboard access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_roles_fall_back_to_user() {
        let role: UserRole = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(role, UserRole::User);
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
    }
}
