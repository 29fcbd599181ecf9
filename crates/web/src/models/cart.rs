//! Cart domain types.
//!
//! A cart is ephemeral: it belongs to the browsing session (its id is kept
//! under [`super::session_keys::CART_ID`]) and is destroyed by checkout.

use dogear_core::{BookId, CartId, CartItemId, Price};

/// One book in a cart.
///
/// `unit_price` is captured from the book at the time it is first added, so
/// later catalog price changes do not reprice lines already in a cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Cart item ID.
    pub id: CartItemId,
    /// The book this line references.
    pub book_id: BookId,
    /// Book title, joined in for display.
    pub book_title: String,
    /// Price captured at add-time.
    pub unit_price: Price,
    /// Number of copies.
    pub quantity: i32,
}

impl CartLine {
    /// Price of the whole line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A session's cart with its lines.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Lines, one per distinct book.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of copies across all lines.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart has no lines. An empty cart cannot be checked out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(id),
            book_id: BookId::new(id),
            book_title: format!("Book {id}"),
            unit_price: Price::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(1, 1050, 3).line_total(), Price::from_cents(3150));
    }

    #[test]
    fn test_subtotal_and_count() {
        let cart = Cart {
            id: CartId::new(1),
            lines: vec![line(1, 1000, 2), line(2, 2050, 1)],
        };
        assert_eq!(cart.subtotal(), Price::from_cents(4050));
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart {
            id: CartId::new(1),
            lines: Vec::new(),
        };
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::default());
        assert_eq!(cart.item_count(), 0);
    }
}
