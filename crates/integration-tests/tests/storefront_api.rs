//! End-to-end tests against a running storefront server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The storefront running (cargo run -p shopfront-storefront)
//!
//! Set `STOREFRONT_BASE_URL` if the server is not on `localhost:3000`.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use shopfront_integration_tests::{session_client, storefront_base_url, unique_email};

const PASSWORD: &str = "correct horse battery";

/// Register a fresh customer and log the client in.
///
/// Each client claims its own forwarded address so the login rate limit
/// applies per test rather than across the whole run.
async fn logged_in_client() -> (Client, String) {
    let client = forwarded_client();
    let base_url = storefront_base_url();
    let email = unique_email("api").to_string();

    let resp = client
        .post(format!("{base_url}/api/user"))
        .json(&json!({ "name": "Api Tester", "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    (client, email)
}

fn forwarded_client() -> Client {
    let octets = Uuid::new_v4().into_bytes();
    let ip = format!("10.{}.{}.{}", octets[0], octets[1], octets[2]);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&ip).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

async fn json_body(resp: reqwest::Response) -> Value {
    resp.json().await.expect("Failed to parse JSON body")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = session_client()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_session_lifecycle() {
    let (client, email) = logged_in_client().await;
    let base_url = storefront_base_url();

    let session = json_body(
        client
            .get(format!("{base_url}/api/auth/session"))
            .send()
            .await
            .expect("Failed to get session"),
    )
    .await;
    assert_eq!(session["email"], email.as_str());
    assert_eq!(session["role"], "customer");

    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/api/auth/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_duplicate_registration() {
    let (client, email) = logged_in_client().await;

    let resp = client
        .post(format!("{}/api/user", storefront_base_url()))
        .json(&json!({ "name": "Again", "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_to_order_flow() {
    let (client, _) = logged_in_client().await;
    let base_url = storefront_base_url();

    let product = json_body(
        client
            .post(format!("{base_url}/api/products"))
            .json(&json!({ "name": "Tea tin", "description": "Airtight", "price": "11.00" }))
            .send()
            .await
            .expect("Failed to create product"),
    )
    .await;
    let product_id = product["id"].as_i64().expect("product id");

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/api/cart"))
            .json(&json!({ "productId": product_id }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart = json_body(
        client
            .get(format!("{base_url}/api/cart"))
            .send()
            .await
            .expect("Failed to get cart"),
    )
    .await;
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    let item_id = items[0]["id"].as_i64().expect("item id");

    let resp = client
        .post(format!("{base_url}/api/orders"))
        .json(&json!({ "selectedItems": [item_id] }))
        .send()
        .await
        .expect("Failed to check out");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order = json_body(resp).await;
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["totalAmount"], "22.00");

    let cart = json_body(
        client
            .get(format!("{base_url}/api/cart"))
            .send()
            .await
            .expect("Failed to get cart"),
    )
    .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

    // The simulated gateway declines a share of payments
    let order_id = order["id"].as_i64().expect("order id");
    let resp = client
        .post(format!("{base_url}/api/orders/{order_id}/payment"))
        .json(&json!({ "paymentMethod": "credit_card" }))
        .send()
        .await
        .expect("Failed to pay");
    assert!(
        resp.status() == StatusCode::OK || resp.status() == StatusCode::BAD_REQUEST,
        "unexpected status {}",
        resp.status()
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_other_users_order_is_hidden() {
    let (owner, _) = logged_in_client().await;
    let (stranger, _) = logged_in_client().await;
    let base_url = storefront_base_url();

    let product = json_body(
        owner
            .post(format!("{base_url}/api/products"))
            .json(&json!({ "name": "Sieve", "description": "Fine mesh", "price": "5" }))
            .send()
            .await
            .expect("Failed to create product"),
    )
    .await;

    let cart = json_body(
        owner
            .post(format!("{base_url}/api/cart"))
            .json(&json!({ "productId": product["id"] }))
            .send()
            .await
            .expect("Failed to add to cart"),
    )
    .await;
    let item_id = cart["items"][0]["id"].clone();

    let resp = stranger
        .delete(format!("{base_url}/api/cart/{item_id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let order = json_body(
        owner
            .post(format!("{base_url}/api/orders"))
            .json(&json!({ "selectedItems": [item_id] }))
            .send()
            .await
            .expect("Failed to check out"),
    )
    .await;

    let resp = stranger
        .get(format!("{base_url}/api/orders/{}", order["id"]))
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
