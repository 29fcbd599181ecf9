//! Admin role management commands.
//!
//! # Usage
//!
//! ```bash
//! dogear-cli admin grant -e jane@example.com
//! dogear-cli admin revoke -e jane@example.com
//! ```
//!
//! The account must already exist (sign up through the site first); admin
//! is a role flag on users, not a separate account type.

use thiserror::Error;

use dogear_web::db::{self, RepositoryError, UserRepository};

/// Errors that can occur during admin role operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No user with the given email.
    #[error("No user exists with email: {0}")]
    UserNotFound(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Set or clear the admin flag on an existing user.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no account has the given email.
pub async fn set_admin(email: &str, admin: bool) -> Result<(), AdminError> {
    let database_url = super::database_url().map_err(AdminError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .set_admin(email, admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.to_owned()),
            other => AdminError::Repository(other),
        })?;

    if admin {
        tracing::info!("Granted admin to {} ({})", user.full_name(), user.email);
    } else {
        tracing::info!("Revoked admin from {} ({})", user.full_name(), user.email);
    }

    Ok(())
}
