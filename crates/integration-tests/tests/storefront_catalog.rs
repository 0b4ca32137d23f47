//! Integration tests for the public catalog surface.
//!
//! These tests require a running storefront server with a populated Sanity
//! test dataset. Run with: cargo test -- --ignored

use reqwest::StatusCode;
use serde_json::Value;
use wellcomp_integration_tests::{client, storefront_base_url};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn health_endpoints_answer() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse health body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn product_list_carries_resolved_prices() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);

    let products: Vec<Value> = resp.json().await.expect("Failed to parse products");
    for product in &products {
        assert!(product["slug"].is_string());
        assert!(product["priceHuf"].is_i64());
        // compareAtHuf, when present, is the undiscounted price
        if let Some(compare_at) = product["compareAtHuf"].as_i64() {
            let price = product["priceHuf"].as_i64().unwrap_or(0);
            assert!(compare_at > price);
        }
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn unknown_product_is_404() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/products/nincs-ilyen-termek"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn zip_lookup_resolves_known_codes() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/zip?q=1011"))
        .send()
        .await
        .expect("Failed to look up ZIP code");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse ZIP body");
    assert_eq!(body["city"], "Budapest");

    // Non-existent codes answer 200 with a null city
    let resp = client
        .get(format!("{base_url}/api/zip?q=0000"))
        .send()
        .await
        .expect("Failed to look up ZIP code");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse ZIP body");
    assert!(body["city"].is_null());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn info_pages_are_served_as_html() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/api/pages"))
        .send()
        .await
        .expect("Failed to list pages");
    assert_eq!(resp.status(), StatusCode::OK);

    let pages: Vec<Value> = resp.json().await.expect("Failed to parse pages");
    assert!(!pages.is_empty());

    let slug = pages[0]["slug"].as_str().expect("page has a slug");
    let resp = client
        .get(format!("{base_url}/api/pages/{slug}"))
        .send()
        .await
        .expect("Failed to get page");
    assert_eq!(resp.status(), StatusCode::OK);

    let page: Value = resp.json().await.expect("Failed to parse page");
    assert!(page["html"].as_str().unwrap_or("").contains('<'));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn arukereso_feed_is_xml() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/feed/arukereso.xml"))
        .send()
        .await
        .expect("Failed to get feed");
    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("application/xml"));

    let body = resp.text().await.expect("Failed to read feed");
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<products>"));
}
