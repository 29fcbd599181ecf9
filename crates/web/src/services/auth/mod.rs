//! Authentication service.
//!
//! Password-based signup, sign-in, and the token-bound password reset flow.
//! Passwords are hashed with argon2; account tokens are URL-safe random
//! strings generated at construction time and rotated when a reset link
//! consumes them.

mod error;

pub use error::{AuthError, ResetRequestError};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore as _;
use sqlx::PgPool;

use dogear_core::Email;

use crate::db::users::{NewAddress, NewUser, UserRepository};
use crate::db::RepositoryError;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of random bytes behind an account token (32 base64 characters).
const TOKEN_BYTES: usize = 24;

/// Validated signup fields, straight from the signup form.
#[derive(Debug, Clone, Default)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Optional nested address; skipped when every field is blank.
    pub address: NewAddress,
}

/// Authentication service.
///
/// Handles user registration, sign-in, and password resets.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user, creating their address alongside when one was
    /// filled in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with user-facing messages if any
    /// field is invalid or the email is already taken.
    pub async fn register(&self, signup: &Signup) -> Result<User, AuthError> {
        let mut errors = Vec::new();

        if signup.first_name.trim().is_empty() {
            errors.push("First name can't be blank".to_owned());
        }
        if signup.last_name.trim().is_empty() {
            errors.push("Last name can't be blank".to_owned());
        }
        let email = if signup.email.trim().is_empty() {
            errors.push("Email can't be blank".to_owned());
            None
        } else {
            match Email::parse(signup.email.trim()) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("Email is invalid".to_owned());
                    None
                }
            }
        };
        errors.extend(validate_password(
            &signup.password,
            &signup.password_confirmation,
        ));

        let Some(email) = email else {
            return Err(AuthError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }
        let password_hash = hash_password(&signup.password)?;
        let token = generate_token();

        let user = self
            .users
            .create(&NewUser {
                first_name: signup.first_name.trim().to_owned(),
                last_name: signup.last_name.trim().to_owned(),
                email,
                password_hash,
                token,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    AuthError::Validation(vec!["Email has already been taken".to_owned()])
                }
                other => AuthError::Repository(other),
            })?;

        if !signup.address.is_blank() {
            self.users.create_address(user.id, &signup.address).await?;
        }

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password does not match.
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Look up the user a password reset should be issued for.
    ///
    /// # Errors
    ///
    /// Returns `ResetRequestError::BlankEmail` for an empty input and
    /// `ResetRequestError::UnknownEmail` when no user has the address
    /// (including syntactically invalid input) - the two cases surface as
    /// distinct flash messages.
    pub async fn request_password_reset(&self, email: &str) -> Result<User, ResetRequestError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ResetRequestError::BlankEmail);
        }

        self.users
            .get_by_email(email)
            .await?
            .ok_or(ResetRequestError::UnknownEmail)
    }

    /// Consume a reset token: validate the new password, store its hash,
    /// and rotate the token so the link cannot be replayed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenNotFound` if the token matches no user and
    /// `AuthError::Validation` if the new password is invalid.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        let errors = validate_password(password, password_confirmation);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let password_hash = hash_password(password)?;
        let new_token = generate_token();
        self.users
            .update_password(user.id, &password_hash, &new_token)
            .await?;

        Ok(User {
            token: new_token,
            ..user
        })
    }
}

// =============================================================================
// Password & Token Helpers
// =============================================================================

/// Validate a password and its confirmation, returning user-facing messages.
#[must_use]
pub fn validate_password(password: &str, confirmation: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.is_empty() {
        errors.push("Password can't be blank".to_owned());
    } else if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password is too short (minimum is {MIN_PASSWORD_LENGTH} characters)"
        ));
    }

    if password != confirmation {
        errors.push("Password confirmation doesn't match Password".to_owned());
    }

    errors
}

/// Hash a password with argon2, producing a PHC string for storage.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match
/// and `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a URL-safe random account token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_bad_stored_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_validate_password_blank() {
        let errors = validate_password("", "");
        assert_eq!(errors, vec!["Password can't be blank".to_owned()]);
    }

    #[test]
    fn test_validate_password_too_short() {
        let errors = validate_password("short", "short");
        assert_eq!(
            errors,
            vec!["Password is too short (minimum is 8 characters)".to_owned()]
        );
    }

    #[test]
    fn test_validate_password_confirmation_mismatch() {
        let errors = validate_password("long enough", "different");
        assert_eq!(
            errors,
            vec!["Password confirmation doesn't match Password".to_owned()]
        );
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long enough", "long enough").is_empty());
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        // 24 bytes -> 32 unpadded base64 characters
        assert_eq!(token.len(), 32);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
