//! Domain models for the bookstore.
//!
//! These types represent validated domain objects separate from database
//! row types (which live beside their queries in [`crate::db`]).

pub mod cart;
pub mod catalog;
pub mod context;
pub mod order;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use catalog::{Author, Book, BookDetail, BookSummary, Publisher};
pub use context::PageContext;
pub use order::{Order, OrderItem, OrderSummary};
pub use session::{CurrentUser, Flash, FlashLevel, session_keys};
pub use user::{Address, User};
