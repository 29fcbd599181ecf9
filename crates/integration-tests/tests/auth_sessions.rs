//! Integration tests for sign-in and sign-out.
//!
//! Requires a running server and database; see `src/lib.rs`.
//!
//! Run with: cargo test -p dogear-integration-tests -- --ignored

use dogear_integration_tests::{base_url, client, sign_up_fresh_user};

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_signin_with_correct_credentials() {
    let client = client();
    let password = "correct horse battery";
    let email = sign_up_fresh_user(&client, password).await;

    let resp = client
        .post(format!("{}/signin", base_url()))
        .form(&[("email", email.as_str()), ("password", password)])
        .send()
        .await
        .expect("request failed");

    // Redirects to the root path
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/");

    // Flash lands on the next page, and the nav now shows the account
    let body = client
        .get(base_url())
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("body read failed");
    assert!(body.contains("Sign in successful"));
    assert!(body.contains("Sign out"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_signin_with_wrong_password() {
    let client = client();
    let email = sign_up_fresh_user(&client, "correct horse battery").await;

    let resp = client
        .post(format!("{}/signin", base_url()))
        .form(&[("email", email.as_str()), ("password", "wrong password")])
        .send()
        .await
        .expect("request failed");

    // Re-renders the form with a danger message; no session is created
    assert!(resp.status().is_success());
    let body = resp.text().await.expect("body read failed");
    assert!(body.contains("Invalid email or password"));

    let home = client
        .get(base_url())
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("body read failed");
    assert!(home.contains("Sign in"));
    assert!(!home.contains("Sign out"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_signout_clears_the_session() {
    let client = client();
    let password = "correct horse battery";
    let email = sign_up_fresh_user(&client, password).await;
    dogear_integration_tests::sign_in(&client, &email, password).await;

    let resp = client
        .post(format!("{}/signout", base_url()))
        .send()
        .await
        .expect("request failed");
    assert!(resp.status().is_redirection());

    let home = client
        .get(base_url())
        .send()
        .await
        .expect("request failed")
        .text()
        .await
        .expect("body read failed");
    assert!(!home.contains("Sign out"));
}
