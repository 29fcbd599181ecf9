//! Cart repository for database operations.
//!
//! Each browsing session owns at most one cart (its id lives in the
//! session), so every operation here is single-writer and needs no locking.

use rust_decimal::Decimal;
use sqlx::PgPool;

use dogear_core::{BookId, CartId, CartItemId, Price};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// Internal row type for cart line queries (joined with books for titles).
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    book_id: i32,
    book_title: String,
    price: Decimal,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            book_id: BookId::new(row.book_id),
            book_title: row.book_title,
            unit_price: Price::new(row.price),
            quantity: row.quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self) -> Result<CartId, RepositoryError> {
        let id: i32 = sqlx::query_scalar("INSERT INTO carts DEFAULT VALUES RETURNING id")
            .fetch_one(self.pool)
            .await?;
        Ok(CartId::new(id))
    }

    /// Load a cart with its lines. Returns `None` if the cart row is gone
    /// (e.g., a stale session id after checkout cleared it server-side).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM carts WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id, ci.book_id, b.title AS book_title, ci.price, ci.quantity
             FROM cart_items ci
             JOIN books b ON b.id = ci.book_id
             WHERE ci.cart_id = $1
             ORDER BY ci.id",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart {
            id,
            lines: rows.into_iter().map(Into::into).collect(),
        }))
    }

    /// Find-or-increment the cart item for a book.
    ///
    /// The first add captures the book's current price into the item; later
    /// adds only bump the quantity, so the captured price sticks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist - the
    /// caller redirects back to the catalog without mutating the cart.
    pub async fn add_book_to_items(
        &self,
        cart_id: CartId,
        book_id: BookId,
    ) -> Result<CartLine, RepositoryError> {
        let book: Option<(String, Decimal)> =
            sqlx::query_as("SELECT title, price FROM books WHERE id = $1")
                .bind(book_id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        let Some((title, price)) = book else {
            return Err(RepositoryError::NotFound);
        };

        let existing: Option<(i32, i32)> = sqlx::query_as(
            "SELECT id, quantity FROM cart_items WHERE cart_id = $1 AND book_id = $2",
        )
        .bind(cart_id.as_i32())
        .bind(book_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let row = match existing {
            Some((item_id, _)) => {
                sqlx::query_as::<_, CartLineRow>(
                    "UPDATE cart_items
                     SET quantity = quantity + 1, updated_at = now()
                     WHERE id = $1
                     RETURNING id, book_id, $2::text AS book_title, price, quantity",
                )
                .bind(item_id)
                .bind(&title)
                .fetch_one(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CartLineRow>(
                    "INSERT INTO cart_items (cart_id, book_id, price, quantity)
                     VALUES ($1, $2, $3, 1)
                     RETURNING id, book_id, $4::text AS book_title, price, quantity",
                )
                .bind(cart_id.as_i32())
                .bind(book_id.as_i32())
                .bind(price)
                .bind(&title)
                .fetch_one(self.pool)
                .await?
            }
        };

        Ok(row.into())
    }

    /// Delete a cart and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn destroy(&self, id: CartId) -> Result<(), RepositoryError> {
        // cart_items cascade from the cart row
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
