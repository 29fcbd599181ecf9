//! User and address domain types.

use chrono::{DateTime, Utc};

use dogear_core::{AddressId, Email, UserId};

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's first name.
    pub first_name: String,
    /// User's last name.
    pub last_name: String,
    /// User's email address, unique case-insensitively.
    pub email: Email,
    /// URL-safe random token, generated at creation and rotated when a
    /// password reset consumes it.
    pub token: String,
    /// Whether the user may reach the admin back-office.
    pub admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user's shipping address.
#[derive(Debug, Clone)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// One-line rendering for order and profile pages.
    #[must_use]
    pub fn single_line(&self) -> String {
        [
            self.address_line1.as_deref(),
            self.address_line2.as_deref(),
            self.city.as_deref(),
            self.zipcode.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let user = User {
            id: UserId::new(1),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: Email::parse("john@example.com").unwrap(),
            token: "tok".to_string(),
            admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.full_name(), "John Doe");
    }

    #[test]
    fn test_address_single_line_skips_blanks() {
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            address_line1: Some("1 Shelf Street".to_string()),
            address_line2: Some(String::new()),
            city: Some("Booktown".to_string()),
            zipcode: None,
            created_at: Utc::now(),
        };
        assert_eq!(address.single_line(), "1 Shelf Street, Booktown");
    }
}
