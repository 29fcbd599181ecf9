//! Book repository for database operations.
//!
//! Books join publishers (many-to-one) and authors (many-to-many via
//! `book_authors`). Listing queries aggregate relation names in SQL so the
//! catalog and admin index pages are a single round trip.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dogear_core::{AuthorId, BookId, Price, PublisherId};

use super::RepositoryError;
use crate::models::{Author, Book, BookDetail, BookSummary};

/// Internal row type for full book queries.
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i32,
    title: String,
    isbn: String,
    price: Decimal,
    page_count: Option<i32>,
    description: Option<String>,
    cover_image: Option<String>,
    published_at: Option<NaiveDate>,
    publisher_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: BookId::new(row.id),
            title: row.title,
            isbn: row.isbn,
            price: Price::new(row.price),
            page_count: row.page_count,
            description: row.description,
            cover_image: row.cover_image,
            published_at: row.published_at,
            publisher_id: row.publisher_id.map(PublisherId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for listing queries with aggregated relation names.
#[derive(Debug, sqlx::FromRow)]
struct BookSummaryRow {
    id: i32,
    title: String,
    isbn: String,
    price: Decimal,
    cover_image: Option<String>,
    publisher_name: Option<String>,
    author_names: Option<String>,
}

impl From<BookSummaryRow> for BookSummary {
    fn from(row: BookSummaryRow) -> Self {
        Self {
            id: BookId::new(row.id),
            title: row.title,
            isbn: row.isbn,
            price: Price::new(row.price),
            cover_image: row.cover_image,
            publisher_name: row.publisher_name,
            author_names: row.author_names,
        }
    }
}

/// Fields for creating or updating a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub price: Decimal,
    pub page_count: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub publisher_id: Option<PublisherId>,
    pub author_ids: Vec<AuthorId>,
}

const SUMMARY_SELECT: &str = "
    SELECT b.id, b.title, b.isbn, b.price, b.cover_image,
           p.name AS publisher_name,
           (SELECT string_agg(a.first_name || ' ' || a.last_name, ', '
                              ORDER BY a.last_name, a.first_name)
              FROM authors a
              JOIN book_authors ba ON ba.author_id = a.id
             WHERE ba.book_id = b.id) AS author_names
      FROM books b
      LEFT JOIN publishers p ON p.id = b.publisher_id";

/// Escape `%`, `_`, and `\` so user input matches literally inside LIKE.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Repository for book database operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every book with publisher and author names, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_summaries(&self) -> Result<Vec<BookSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY b.title");
        let rows = sqlx::query_as::<_, BookSummaryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring search over title, ISBN, description, and
    /// author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<BookSummary>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));
        let sql = format!(
            "{SUMMARY_SELECT}
             WHERE b.title ILIKE $1
                OR b.isbn ILIKE $1
                OR b.description ILIKE $1
                OR EXISTS (SELECT 1
                             FROM book_authors ba
                             JOIN authors a ON a.id = ba.author_id
                            WHERE ba.book_id = b.id
                              AND (a.first_name || ' ' || a.last_name) ILIKE $1)
             ORDER BY b.title"
        );

        let rows = sqlx::query_as::<_, BookSummaryRow>(&sql)
            .bind(pattern)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, isbn, price, page_count, description, cover_image,
                    published_at, publisher_id, created_at, updated_at
             FROM books
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a book with its publisher and authors loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_detail(&self, id: BookId) -> Result<Option<BookDetail>, RepositoryError> {
        let Some(book) = self.get(id).await? else {
            return Ok(None);
        };

        let publisher = match book.publisher_id {
            Some(publisher_id) => {
                super::PublisherRepository::new(self.pool)
                    .get(publisher_id)
                    .await?
            }
            None => None,
        };

        let authors = self.authors_for(id).await?;

        Ok(Some(BookDetail {
            book,
            publisher,
            authors,
        }))
    }

    /// Authors attached to a book, last name first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn authors_for(&self, id: BookId) -> Result<Vec<Author>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            first_name: String,
            last_name: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT a.id, a.first_name, a.last_name, a.created_at, a.updated_at
             FROM authors a
             JOIN book_authors ba ON ba.author_id = a.id
             WHERE ba.book_id = $1
             ORDER BY a.last_name, a.first_name",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Author {
                id: AuthorId::new(row.id),
                first_name: row.first_name,
                last_name: row.last_name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Create a book and link its authors, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ISBN is already taken.
    pub async fn create(&self, new: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BookRow>(
            "INSERT INTO books (title, isbn, price, page_count, description,
                                cover_image, published_at, publisher_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, title, isbn, price, page_count, description, cover_image,
                       published_at, publisher_id, created_at, updated_at",
        )
        .bind(&new.title)
        .bind(&new.isbn)
        .bind(new.price)
        .bind(new.page_count)
        .bind(&new.description)
        .bind(&new.cover_image)
        .bind(new.published_at)
        .bind(new.publisher_id.map(|p| p.as_i32()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "isbn has already been taken"))?;

        for author_id in &new.author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(author_id.as_i32())
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::from_sqlx(e, "author does not exist"))?;
        }

        tx.commit().await?;
        Ok(row.into())
    }

    /// Update a book and replace its author links, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no book has the given ID.
    /// Returns `RepositoryError::Conflict` if the ISBN is already taken.
    pub async fn update(&self, id: BookId, new: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BookRow>(
            "UPDATE books
             SET title = $2, isbn = $3, price = $4, page_count = $5, description = $6,
                 cover_image = $7, published_at = $8, publisher_id = $9, updated_at = now()
             WHERE id = $1
             RETURNING id, title, isbn, price, page_count, description, cover_image,
                       published_at, publisher_id, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(&new.title)
        .bind(&new.isbn)
        .bind(new.price)
        .bind(new.page_count)
        .bind(&new.description)
        .bind(&new.cover_image)
        .bind(new.published_at)
        .bind(new.publisher_id.map(|p| p.as_i32()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "isbn has already been taken"))?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        for author_id in &new.author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(id.as_i32())
                .bind(author_id.as_i32())
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::from_sqlx(e, "author does not exist"))?;
        }

        tx.commit().await?;
        Ok(row.into())
    }

    /// Delete a book. Fails with `Conflict` if the book appears in an order
    /// (order items are immutable history and keep their book reference).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no book has the given ID.
    pub async fn delete(&self, id: BookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "book has been ordered"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all books.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM books")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("javascript"), "javascript");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
