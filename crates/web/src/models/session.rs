//! Session-related types.
//!
//! Types stored in the session: the authenticated user's identity, the
//! session's cart id, and the one-request flash message.

use serde::{Deserialize, Serialize};

use dogear_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub name: String,
    /// Whether the user may reach the admin back-office.
    pub admin: bool,
}

/// Severity of a [`Flash`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl std::fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// A one-request-lifetime status message.
///
/// Stored in the session on redirect and taken (removed) by the next page
/// render; pages that re-render a form after a failure attach it directly
/// without touching the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    /// Severity, which doubles as the CSS class suffix.
    pub level: FlashLevel,
    /// User-facing message text.
    pub message: String,
}

impl Flash {
    /// A success flash.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// A danger flash.
    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

/// Session keys for stored state.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the session's cart id.
    pub const CART_ID: &str = "cart_id";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_constructors() {
        let flash = Flash::success("Author has been created");
        assert_eq!(flash.level, FlashLevel::Success);
        assert_eq!(flash.message, "Author has been created");

        let flash = Flash::danger("Email invalid.");
        assert_eq!(flash.level, FlashLevel::Danger);
    }

    #[test]
    fn test_flash_level_display() {
        assert_eq!(FlashLevel::Success.to_string(), "success");
        assert_eq!(FlashLevel::Danger.to_string(), "danger");
    }
}
