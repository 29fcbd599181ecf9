//! Checkout service: the open-cart to placed-order transition.
//!
//! The transition is a single request's unit of work: the cart is read,
//! the order and its items are written (and the cart destroyed) in one
//! transaction, and a confirmation email is dispatched by the caller after
//! commit. A failure anywhere rolls back and leaves the cart as it was.

use sqlx::PgPool;
use thiserror::Error;

use dogear_core::{CartId, UserId};

use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::Order;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session has no cart, or its cart has no items. Orders are only
    /// created from non-empty carts.
    #[error("cart is empty")]
    EmptyCart,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for the signed-in user from their session cart.
    ///
    /// Each order item copies the book, quantity, and the cart-captured
    /// price - a catalog price change after add-to-cart does not reprice
    /// the order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to order.
    pub async fn place_order(
        &self,
        user_id: UserId,
        cart_id: Option<CartId>,
    ) -> Result<Order, CheckoutError> {
        let Some(cart_id) = cart_id else {
            return Err(CheckoutError::EmptyCart);
        };

        let cart = CartRepository::new(self.pool)
            .get(cart_id)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = OrderRepository::new(self.pool)
            .create_from_cart(user_id, &cart)
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            items = order.items.len(),
            "order placed"
        );

        Ok(order)
    }
}
