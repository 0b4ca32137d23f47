//! Integration tests for the cookie cart.
//!
//! The cart lives entirely in cookies, so these tests use a cookie-store
//! client and verify the server round-trips state between requests.
//!
//! Requires a running storefront server with at least one in-stock product.
//! Run with: cargo test -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use wellcomp_integration_tests::{client, storefront_base_url};

/// Pick any purchasable product from the live catalog.
async fn any_product_slug(client: &reqwest::Client, base_url: &str) -> String {
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to get products")
        .json()
        .await
        .expect("Failed to parse products");

    products
        .iter()
        .find(|p| p["inStock"] == json!(true))
        .and_then(|p| p["slug"].as_str())
        .expect("Test dataset has at least one in-stock product")
        .to_string()
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn cart_starts_empty() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["itemCount"], 0);
    assert_eq!(body["totalHuf"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn add_update_remove_round_trip() {
    let client = client();
    let base_url = storefront_base_url();
    let slug = any_product_slug(&client, &base_url).await;

    // Add
    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({ "slug": slug, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["itemCount"], 2);
    let total_for_two = body["totalHuf"].as_i64().expect("cart has a total");
    assert!(total_for_two > 0);

    // Update quantity (the cookie from the add must carry over)
    let resp = client
        .post(format!("{base_url}/api/cart/update"))
        .json(&json!({ "slug": slug, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to update cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["itemCount"], 1);
    assert_eq!(body["totalHuf"].as_i64(), Some(total_for_two / 2));

    // Remove
    let resp = client
        .post(format!("{base_url}/api/cart/remove"))
        .json(&json!({ "slug": slug }))
        .send()
        .await
        .expect("Failed to remove from cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["itemCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn zero_quantity_add_is_rejected() {
    let client = client();
    let base_url = storefront_base_url();
    let slug = any_product_slug(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({ "slug": slug, "quantity": 0 }))
        .send()
        .await
        .expect("Failed to post to cart");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn tampered_cart_cookie_falls_back_to_empty() {
    let base_url = storefront_base_url();

    // No cookie store: send a hand-built garbage cookie instead.
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{base_url}/api/cart"))
        .header("cookie", "cart-json=nem-base64-%%%")
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(body["itemCount"], 0);
}
