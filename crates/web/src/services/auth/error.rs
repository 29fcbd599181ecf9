//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more fields failed validation; messages are user-facing and
    /// rendered back into the form.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No user carries the presented account token.
    #[error("token not found")]
    TokenNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Errors for the password-reset request step.
///
/// The two user errors map to distinct flash messages ("Email can't be
/// blank." vs "Email invalid."), so they are separate variants.
#[derive(Debug, Error)]
pub enum ResetRequestError {
    /// No email was filled in.
    #[error("email is blank")]
    BlankEmail,

    /// The email does not belong to any user.
    #[error("email does not match a user")]
    UnknownEmail,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
