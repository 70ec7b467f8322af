//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use std::fmt;

use serde::{Deserialize, Serialize};

use zaheen_core::{Email, EmailError, UserId, UserRole};

use crate::backend::AuthSession;

/// Session-stored user identity.
///
/// Holds the backend-issued token so authenticated backend calls can be made
/// on the user's behalf. The token never leaves the server.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    token: String,
}

impl CurrentUser {
    /// Build the session identity from a successful backend login.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reported an unusable email address.
    pub fn from_auth(session: AuthSession) -> Result<Self, EmailError> {
        let email = Email::parse(&session.user.email)?;
        Ok(Self {
            id: session.user.id,
            name: session.user.name,
            email,
            role: session.user.role,
            token: session.token,
        })
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.email.as_str()
        } else {
            &self.name
        }
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted cart snapshot.
    pub const CART: &str = zaheen_core::CART_STORAGE_KEY;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::User;

    fn auth(role: UserRole, name: &str) -> AuthSession {
        AuthSession {
            token: "secret-token".to_string(),
            user: User {
                id: UserId::new("u1"),
                name: name.to_string(),
                email: "Ayesha@Example.com".to_string(),
                role,
            },
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let user = CurrentUser::from_auth(auth(UserRole::Admin, "Ayesha")).unwrap();
        let debug = format!("{user:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
        assert!(user.is_admin());
        assert_eq!(user.token(), "secret-token");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = CurrentUser::from_auth(auth(UserRole::User, "")).unwrap();
        assert_eq!(user.display_name(), "Ayesha@example.com");
    }

    #[test]
    fn test_rejects_invalid_email() {
        let mut session = auth(UserRole::User, "x");
        session.user.email = "not-an-email".to_string();
        assert!(CurrentUser::from_auth(session).is_err());
    }

    #[test]
    fn test_session_round_trip_keeps_token() {
        let user = CurrentUser::from_auth(auth(UserRole::User, "Ayesha")).unwrap();
        let value = serde_json::to_value(&user).unwrap();
        let restored: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(restored.token(), "secret-token");
    }

    #[test]
    fn test_cart_key_is_shared_storage_key() {
        assert_eq!(keys::CART, "zaheen-cart");
        assert_ne!(keys::CART, keys::CURRENT_USER);
    }
}
