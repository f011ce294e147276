//! User domain types.

use chrono::{DateTime, Utc};

use shopfront_core::{Email, UserId, UserRole};

/// A storefront account (domain type).
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Customer or admin.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
