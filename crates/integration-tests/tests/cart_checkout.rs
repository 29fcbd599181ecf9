//! Integration tests for the cart and checkout flow.
//!
//! Requires a running server and database with the seed catalog applied;
//! see `src/lib.rs`.
//!
//! Run with: cargo test -p dogear-integration-tests -- --ignored

use dogear_integration_tests::{base_url, client, count, sign_up_fresh_user, test_pool};

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_adding_unknown_book_mutates_nothing() {
    let client = client();
    let pool = test_pool().await;

    let before = count(&pool, "cart_items").await;

    let resp = client
        .post(format!("{}/cart_items", base_url()))
        .form(&[("book_id", "999999")])
        .send()
        .await
        .expect("request failed");

    // Bounces back to the catalog without creating anything
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/");

    assert_eq!(count(&pool, "cart_items").await, before);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_adding_a_book_twice_bumps_quantity() {
    let client = client();
    let pool = test_pool().await;

    let book_id: i32 = sqlx::query_scalar("SELECT id FROM books ORDER BY id LIMIT 1")
        .fetch_one(&pool)
        .await
        .expect("seed catalog must have a book");

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/cart_items", base_url()))
            .form(&[("book_id", book_id.to_string().as_str())])
            .send()
            .await
            .expect("request failed");
        assert!(resp.status().is_redirection());
    }

    let body = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("body read failed");
    assert!(body.contains("<td>2</td>"), "quantity should be 2");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_checkout_creates_order_and_clears_cart() {
    let client = client();
    let pool = test_pool().await;
    let password = "long enough password";
    let email = sign_up_fresh_user(&client, password).await;
    dogear_integration_tests::sign_in(&client, &email, password).await;

    let book_id: i32 = sqlx::query_scalar("SELECT id FROM books ORDER BY id LIMIT 1")
        .fetch_one(&pool)
        .await
        .expect("seed catalog must have a book");

    client
        .post(format!("{}/cart_items", base_url()))
        .form(&[("book_id", book_id.to_string().as_str())])
        .send()
        .await
        .expect("request failed");

    let orders_before = count(&pool, "orders").await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("request failed");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(location.starts_with("/orders/"));

    assert_eq!(count(&pool, "orders").await, orders_before + 1);

    // The cart is gone; checkout again reports it empty
    let resp = client
        .post(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("request failed");
    let bounced = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(bounced, "/cart");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_checkout_requires_signin() {
    let client = client();

    let resp = client
        .get(format!("{}/orders/new", base_url()))
        .send()
        .await
        .expect("request failed");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/signin");
}
