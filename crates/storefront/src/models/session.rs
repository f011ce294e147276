//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use shopfront_core::{Email, UserId, UserRole};

use super::user::User;

/// Session-stored user identity.
///
/// Also the body of `GET /api/auth/session` and of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Role at login time.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user may modify a resource owned by `owner`.
    #[must_use]
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.id == owner || self.role.is_admin()
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(id: i32, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            name: "Sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_can_manage() {
        assert!(user(1, UserRole::Customer).can_manage(UserId::new(1)));
        assert!(!user(1, UserRole::Customer).can_manage(UserId::new(2)));
        assert!(user(1, UserRole::Admin).can_manage(UserId::new(2)));
    }

    #[test]
    fn test_serializes_for_session_endpoint() {
        let json = serde_json::to_value(user(4, UserRole::Admin)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "name": "Sam",
                "email": "sam@example.com",
                "role": "admin"
            })
        );
    }
}
