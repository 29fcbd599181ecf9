//! Integration tests for Dogear Books.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p dogear-cli -- migrate
//! cargo run -p dogear-cli -- seed
//!
//! # Start the server
//! cargo run -p dogear-web
//!
//! # Run integration tests
//! cargo test -p dogear-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `DOGEAR_BASE_URL` - Server under test (default: <http://localhost:3000>)
//! - `DOGEAR_DATABASE_URL` - Database for row-count assertions
//! - `DOGEAR_TEST_ADMIN_EMAIL` / `DOGEAR_TEST_ADMIN_PASSWORD` - An admin
//!   account (defaults to the `dogear-cli seed` demo admin)

use reqwest::{Client, redirect::Policy};
use sqlx::PgPool;

/// Base URL for the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("DOGEAR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A browser-like client: cookie jar on, redirects NOT followed so tests
/// can assert on Location headers.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the test database for row-count assertions.
///
/// # Panics
///
/// Panics if `DOGEAR_DATABASE_URL` is unset or unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("DOGEAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("DOGEAR_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// Count rows in a table.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query failed")
}

/// Sign the client in through the real form endpoint.
///
/// # Panics
///
/// Panics if the request fails or the credentials are rejected.
pub async fn sign_in(client: &Client, email: &str, password: &str) {
    let resp = client
        .post(format!("{}/signin", base_url()))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("sign-in request failed");

    assert!(
        resp.status().is_redirection(),
        "sign-in should redirect on success (got {})",
        resp.status()
    );
}

/// Sign in as the test admin (the `dogear-cli seed` demo admin by default).
pub async fn sign_in_as_admin(client: &Client) {
    let email = std::env::var("DOGEAR_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@dogearbooks.test".to_string());
    let password = std::env::var("DOGEAR_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "paperback-writer".to_string());
    sign_in(client, &email, &password).await;
}

/// Sign up a fresh (non-admin) user and return their email.
///
/// # Panics
///
/// Panics if the signup does not redirect to the new user's page.
pub async fn sign_up_fresh_user(client: &Client, password: &str) -> String {
    let email = format!("user-{}@example.com", uuid::Uuid::new_v4().simple());
    let resp = client
        .post(format!("{}/users", base_url()))
        .form(&[
            ("first_name", "Test"),
            ("last_name", "Reader"),
            ("email", &email),
            ("password", password),
            ("password_confirmation", password),
        ])
        .send()
        .await
        .expect("signup request failed");

    assert!(
        resp.status().is_redirection(),
        "signup should redirect on success (got {})",
        resp.status()
    );

    email
}
