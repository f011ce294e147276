//! User role management commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli user promote -e admin@example.com
//! sf-cli user demote -e admin@example.com
//! ```
//!
//! Role changes take effect on the user's next login; existing sessions keep
//! the role they were created with.

use shopfront_core::{Email, UserRole};
use shopfront_storefront::db::{RepositoryError, UserRepository};

use super::{CliError, connect};

/// Set the role of the user with this email.
///
/// # Errors
///
/// Returns an error if the email is invalid, no such user exists, or the
/// database operation fails.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|_| CliError::InvalidEmail(email.to_owned()))?;

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&email, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!("Role updated: {} ({}) is now {}", user.email, user.id, user.role);
    Ok(())
}
