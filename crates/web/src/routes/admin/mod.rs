//! Admin back-office route handlers.
//!
//! Every handler takes the [`crate::middleware::RequireAdmin`] extractor:
//! guests bounce to the sign-in page, signed-in non-admins bounce home
//! with an authorization flash.
//!
//! HTML forms can't issue PUT/DELETE, so updates POST to the entity path
//! and deletes POST to `{id}/delete` (PATCH is also wired for API use).

pub mod authors;
pub mod books;
pub mod dashboard;
pub mod publishers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin router, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        // Authors
        .route("/authors", get(authors::index).post(authors::create))
        .route("/authors/new", get(authors::new))
        .route(
            "/authors/{id}",
            get(authors::show)
                .post(authors::update)
                .patch(authors::update),
        )
        .route("/authors/{id}/edit", get(authors::edit))
        .route("/authors/{id}/delete", post(authors::destroy))
        // Books
        .route("/books", get(books::index).post(books::create))
        .route("/books/new", get(books::new))
        .route(
            "/books/{id}",
            get(books::show).post(books::update).patch(books::update),
        )
        .route("/books/{id}/edit", get(books::edit))
        .route("/books/{id}/delete", post(books::destroy))
        // Publishers (no /publishers/new - the form hangs off /add_publisher)
        .route(
            "/publishers",
            get(publishers::index).post(publishers::create),
        )
        .route("/add_publisher", get(publishers::new))
        .route(
            "/publishers/{id}",
            get(publishers::show)
                .post(publishers::update)
                .patch(publishers::update),
        )
        .route("/publishers/{id}/edit", get(publishers::edit))
        .route("/publishers/{id}/delete", post(publishers::destroy))
}
