//! Order repository for database operations.
//!
//! Order rows and their items are written exactly once, inside a
//! transaction that also destroys the source cart. There are no update
//! statements in this module: orders are immutable history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dogear_core::{BookId, OrderId, OrderItemId, Price, UserId};

use super::RepositoryError;
use crate::models::{Cart, Order, OrderItem, OrderSummary};

/// Internal row type for order item queries (joined with books for titles).
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    book_id: i32,
    book_title: String,
    price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            book_id: BookId::new(row.book_id),
            book_title: row.book_title,
            price: Price::new(row.price),
            quantity: row.quantity,
        }
    }
}

/// Internal row type for order history listings.
#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: i32,
    created_at: DateTime<Utc>,
    total: Decimal,
    item_count: i64,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            created_at: row.created_at,
            total: Price::new(row.total),
            item_count: row.item_count,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from a loaded cart, in one transaction.
    ///
    /// For each cart line an order item is inserted copying the book, the
    /// quantity, and the cart-captured price; the cart and its items are
    /// then deleted. If any insert fails the whole transaction rolls back
    /// and the cart is left untouched.
    ///
    /// The caller must ensure the cart is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        cart: &Cart,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, created_at",
        )
        .bind(user_id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let item_id: i32 = sqlx::query_scalar(
                "INSERT INTO order_items (order_id, book_id, price, quantity)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id",
            )
            .bind(order_id)
            .bind(line.book_id.as_i32())
            .bind(line.unit_price.amount())
            .bind(line.quantity)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: OrderItemId::new(item_id),
                book_id: line.book_id,
                book_title: line.book_title.clone(),
                price: line.unit_price,
                quantity: line.quantity,
            });
        }

        // Retire the cart; its items cascade
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart.id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(order_id),
            user_id,
            created_at,
            items,
        })
    }

    /// Get an order with its items, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let order: Option<(i32, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, created_at FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some((order_id, created_at)) = order else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT oi.id, oi.book_id, b.title AS book_title, oi.price, oi.quantity
             FROM order_items oi
             JOIN books b ON b.id = oi.book_id
             WHERE oi.order_id = $1
             ORDER BY oi.id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Order {
            id,
            user_id,
            created_at,
            items: rows.into_iter().map(Into::into).collect(),
        }))
    }

    /// List a user's orders, newest first, with totals aggregated in SQL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            "SELECT o.id, o.created_at,
                    COALESCE(sum(oi.price * oi.quantity), 0) AS total,
                    COALESCE(sum(oi.quantity), 0)::bigint AS item_count
             FROM orders o
             LEFT JOIN order_items oi ON oi.order_id = o.id
             WHERE o.user_id = $1
             GROUP BY o.id, o.created_at
             ORDER BY o.created_at DESC",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
