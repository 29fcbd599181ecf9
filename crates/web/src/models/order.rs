//! Order domain types.
//!
//! Orders are immutable historical records: their items snapshot the book,
//! quantity, and price as they stood in the cart at checkout. There is no
//! update path for either table.

use chrono::{DateTime, Utc};

use dogear_core::{BookId, OrderId, OrderItemId, Price, UserId};

/// One purchased line in an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Order item ID.
    pub id: OrderItemId,
    /// The purchased book.
    pub book_id: BookId,
    /// Book title, joined in for display.
    pub book_title: String,
    /// Price frozen at checkout (the cart-captured price).
    pub price: Price,
    /// Number of copies purchased.
    pub quantity: i32,
}

impl OrderItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A placed order with its items.
#[derive(Debug, Clone)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// The user who placed the order.
    pub user_id: UserId,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Purchased lines.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total order amount.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Total number of copies in the order.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A one-row order listing for account history pages.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub total: Price,
    pub item_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total() {
        let order = Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            created_at: Utc::now(),
            items: vec![
                OrderItem {
                    id: OrderItemId::new(1),
                    book_id: BookId::new(1),
                    book_title: "A".to_string(),
                    price: Price::from_cents(1000),
                    quantity: 1,
                },
                OrderItem {
                    id: OrderItemId::new(2),
                    book_id: BookId::new(2),
                    book_title: "B".to_string(),
                    price: Price::from_cents(2000),
                    quantity: 2,
                },
            ],
        };

        assert_eq!(order.total(), Price::from_cents(5000));
        assert_eq!(order.item_count(), 3);
    }
}
