//! Publisher repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dogear_core::PublisherId;

use super::RepositoryError;
use crate::models::Publisher;

/// Internal row type for publisher queries.
#[derive(Debug, sqlx::FromRow)]
struct PublisherRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PublisherRow> for Publisher {
    fn from(row: PublisherRow) -> Self {
        Self {
            id: PublisherId::new(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for publisher database operations.
pub struct PublisherRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PublisherRepository<'a> {
    /// Create a new publisher repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all publishers by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Publisher>, RepositoryError> {
        let rows = sqlx::query_as::<_, PublisherRow>(
            "SELECT id, name, created_at, updated_at FROM publishers ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a publisher by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PublisherId) -> Result<Option<Publisher>, RepositoryError> {
        let row = sqlx::query_as::<_, PublisherRow>(
            "SELECT id, name, created_at, updated_at FROM publishers WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new publisher.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, name: &str) -> Result<Publisher, RepositoryError> {
        let row = sqlx::query_as::<_, PublisherRow>(
            "INSERT INTO publishers (name)
             VALUES ($1)
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a publisher's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no publisher has the given ID.
    pub async fn update(&self, id: PublisherId, name: &str) -> Result<Publisher, RepositoryError> {
        let row = sqlx::query_as::<_, PublisherRow>(
            "UPDATE publishers
             SET name = $2, updated_at = now()
             WHERE id = $1
             RETURNING id, name, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a publisher. Books keep existing with their publisher unset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no publisher has the given ID.
    pub async fn delete(&self, id: PublisherId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all publishers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM publishers")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
