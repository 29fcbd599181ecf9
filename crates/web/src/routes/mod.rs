//! HTTP route handlers for the bookstore.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Catalog listing
//! GET  /health                   - Health check
//!
//! # Catalog
//! GET  /catalog/{id}             - Book detail
//! POST /catalog/search           - Catalog search
//!
//! # Cart
//! GET    /cart                   - Cart page
//! DELETE /cart                   - Empty the cart (POST /cart/clear fallback)
//! POST   /cart_items             - Add a book to the cart
//!
//! # Checkout (requires sign-in)
//! GET  /orders/new               - Checkout review
//! POST /orders                   - Place the order
//! GET  /orders/{id}              - Order detail (owner only)
//!
//! # Accounts
//! GET  /signup                   - Signup form
//! GET  /users                    - User index (admin only)
//! POST /users                    - Create account
//! GET  /users/{id}               - Profile page
//!
//! # Sessions
//! GET  /signin                   - Sign-in form
//! POST /signin                   - Sign in
//! POST /signout                  - Sign out (DELETE /session fallback)
//!
//! # Password reset
//! GET   /reset_password               - Request form
//! POST  /password_resets              - Issue reset email
//! GET   /password_resets/{token}/edit - Token-bound new-password form
//! PATCH /password_resets/{token}      - Consume token, set password
//!
//! # Admin back-office (session-gated, admin only)
//! GET  /admin                    - Dashboard
//! .... /admin/authors            - Author CRUD
//! .... /admin/books              - Book CRUD
//! .... /admin/publishers         - Publisher CRUD
//! ```

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod password_resets;
pub mod sessions;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create all routes for the bookstore.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(catalog::index))
        .route("/catalog/{id}", get(catalog::show))
        .route("/catalog/search", post(catalog::search))
        // Cart
        .route("/cart", get(cart::show).delete(cart::destroy))
        .route("/cart/clear", post(cart::destroy))
        .route("/cart_items", post(cart::create))
        // Checkout
        .route("/orders/new", get(orders::new))
        .route("/orders", post(orders::create))
        .route("/orders/{id}", get(orders::show))
        // Accounts
        .route("/signup", get(users::new))
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}", get(users::show))
        // Sessions
        .route("/signin", get(sessions::new).post(sessions::create))
        .route("/signout", post(sessions::destroy))
        .route("/session", delete(sessions::destroy))
        // Password reset
        .route("/reset_password", get(password_resets::new))
        .route("/password_resets", post(password_resets::create))
        .route(
            "/password_resets/{token}/edit",
            get(password_resets::edit),
        )
        .route(
            "/password_resets/{token}",
            post(password_resets::update).patch(password_resets::update),
        )
        // Admin back-office
        .nest("/admin", admin::routes())
}
