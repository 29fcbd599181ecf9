//! Author repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dogear_core::AuthorId;

use super::RepositoryError;
use crate::models::Author;

/// Internal row type for author queries.
#[derive(Debug, sqlx::FromRow)]
struct AuthorRow {
    id: i32,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for author database operations.
pub struct AuthorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorRepository<'a> {
    /// Create a new author repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all authors, last name first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Author>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, first_name, last_name, created_at, updated_at
             FROM authors
             ORDER BY last_name, first_name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an author by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AuthorId) -> Result<Option<Author>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, first_name, last_name, created_at, updated_at
             FROM authors
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new author.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Author, RepositoryError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "INSERT INTO authors (first_name, last_name)
             VALUES ($1, $2)
             RETURNING id, first_name, last_name, created_at, updated_at",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update an author's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no author has the given ID.
    pub async fn update(
        &self,
        id: AuthorId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Author, RepositoryError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "UPDATE authors
             SET first_name = $2, last_name = $3, updated_at = now()
             WHERE id = $1
             RETURNING id, first_name, last_name, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete an author. Join rows in `book_authors` cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no author has the given ID.
    pub async fn delete(&self, id: AuthorId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all authors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM authors")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
