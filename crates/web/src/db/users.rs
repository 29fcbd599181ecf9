//! User and address repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dogear_core::{AddressId, Email, UserId};

use super::RepositoryError;
use crate::models::{Address, User};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    token: String,
    admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            token: row.token,
            admin: row.admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    zipcode: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            zipcode: row.zipcode,
            created_at: row.created_at,
        }
    }
}

/// Fields for creating a user. The password is already hashed and the
/// token already generated by the auth service.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub token: String,
}

/// Fields for creating an address.
#[derive(Debug, Clone, Default)]
pub struct NewAddress {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
}

impl NewAddress {
    /// Whether any field was filled in (blank address forms are skipped).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [
            &self.address_line1,
            &self.address_line2,
            &self.city,
            &self.zipcode,
        ]
        .into_iter()
        .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, token, admin, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their account token (password-reset links).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE token = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user together with their password hash, for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            first_name: String,
            last_name: String,
            email: String,
            token: String,
            admin: bool,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, Row>(
            "SELECT id, first_name, last_name, email, token, admin,
                    created_at, updated_at, password_hash
             FROM users
             WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let hash = row.password_hash.clone();
                let user = UserRow {
                    id: row.id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    email: row.email,
                    token: row.token,
                    admin: row.admin,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .try_into()?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, token)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.email.as_str())
            .bind(&new.password_hash)
            .bind(&new.token)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "email has already been taken"))?;

        row.try_into()
    }

    /// Replace a user's password hash and rotate their token (reset links
    /// are single-use).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has the given ID.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        new_token: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users
             SET password_hash = $2, token = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(password_hash)
        .bind(new_token)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set or clear a user's admin flag, by email. Returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has the given email.
    pub async fn set_admin(&self, email: &str, admin: bool) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET admin = $2, updated_at = now()
             WHERE lower(email) = lower($1)
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(admin)
            .fetch_optional(self.pool)
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_address(
        &self,
        user_id: UserId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO addresses (user_id, address_line1, address_line2, city, zipcode)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, user_id, address_line1, address_line2, city, zipcode, created_at",
        )
        .bind(user_id.as_i32())
        .bind(&new.address_line1)
        .bind(&new.address_line2)
        .bind(&new.city)
        .bind(&new.zipcode)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List a user's addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id, user_id, address_line1, address_line2, city, zipcode, created_at
             FROM addresses
             WHERE user_id = $1
             ORDER BY created_at",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_address_blankness() {
        assert!(NewAddress::default().is_blank());
        assert!(
            NewAddress {
                address_line1: Some(String::new()),
                ..NewAddress::default()
            }
            .is_blank()
        );
        assert!(
            !NewAddress {
                city: Some("Booktown".to_string()),
                ..NewAddress::default()
            }
            .is_blank()
        );
    }
}
