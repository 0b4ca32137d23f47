//! Integration tests for payment settlement through the Stripe webhook.
//!
//! Requires a running storefront server with a writable test dataset, at
//! least one in-stock product, and `STRIPE_WEBHOOK_SECRET` in the
//! environment matching the server's. Run with: cargo test -- --ignored

use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;
use wellcomp_integration_tests::{client, storefront_base_url};

/// Sign a payload the way Stripe does: HMAC-SHA256 over `"{t}.{body}"`.
fn stripe_signature(payload: &str, secret: &str) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs();

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(now.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());

    format!("t={now},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// Create an order through the public API and return its id.
async fn create_order(client: &reqwest::Client, base_url: &str) -> String {
    let products: Vec<Value> = client
        .get(format!("{base_url}/api/products"))
        .send()
        .await
        .expect("Failed to get products")
        .json()
        .await
        .expect("Failed to parse products");
    let slug = products
        .iter()
        .find(|p| p["inStock"] == json!(true))
        .and_then(|p| p["slug"].as_str())
        .expect("Test dataset has at least one in-stock product");

    let resp = client
        .post(format!("{base_url}/api/cart/add"))
        .json(&json!({ "slug": slug, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let order: Value = client
        .post(format!("{base_url}/api/checkout/order"))
        .json(&json!({
            "name": "Teszt Elek",
            "email": "teszt@example.com",
            "zip": "1011",
            "city": "Budapest",
            "street": "Fő utca 1."
        }))
        .send()
        .await
        .expect("Failed to post checkout")
        .json()
        .await
        .expect("Failed to parse checkout body");

    order["orderId"]
        .as_str()
        .expect("checkout returns an order id")
        .to_string()
}

#[tokio::test]
#[ignore = "Requires running storefront server and STRIPE_WEBHOOK_SECRET"]
async fn webhook_delivered_twice_settles_once() {
    let client = client();
    let base_url = storefront_base_url();
    let secret = std::env::var("STRIPE_WEBHOOK_SECRET")
        .expect("STRIPE_WEBHOOK_SECRET must match the server's");

    let order_id = create_order(&client, &base_url).await;
    let session_id = format!("cs_test_{}", Uuid::new_v4().simple());

    let payload = json!({
        "id": format!("evt_{}", Uuid::new_v4().simple()),
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "metadata": { "orderId": order_id }
        } }
    })
    .to_string();

    // First delivery settles the order
    let resp = client
        .post(format!("{base_url}/api/stripe/webhook"))
        .header("stripe-signature", stripe_signature(&payload, &secret))
        .body(payload.clone())
        .send()
        .await
        .expect("Failed to post webhook");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse webhook body");
    assert_eq!(body["received"], true);

    let status: Value = client
        .get(format!(
            "{base_url}/api/barion/order-status?paymentId={session_id}"
        ))
        .send()
        .await
        .expect("Failed to get order status")
        .json()
        .await
        .expect("Failed to parse order status");
    assert_eq!(status["paid"], true);
    assert_eq!(status["status"], "FIZETVE");

    // Second delivery of the same event is acknowledged but changes nothing
    let resp = client
        .post(format!("{base_url}/api/stripe/webhook"))
        .header("stripe-signature", stripe_signature(&payload, &secret))
        .body(payload)
        .send()
        .await
        .expect("Failed to post webhook");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse webhook body");
    assert_eq!(body["received"], true);

    let status: Value = client
        .get(format!(
            "{base_url}/api/barion/order-status?paymentId={session_id}"
        ))
        .send()
        .await
        .expect("Failed to get order status")
        .json()
        .await
        .expect("Failed to parse order status");
    assert_eq!(status["status"], "FIZETVE");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn unsigned_webhook_is_rejected() {
    let client = client();
    let base_url = storefront_base_url();

    let payload = json!({
        "id": "evt_unsigned",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_unsigned" } }
    })
    .to_string();

    // No signature header at all
    let resp = client
        .post(format!("{base_url}/api/stripe/webhook"))
        .body(payload.clone())
        .send()
        .await
        .expect("Failed to post webhook");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A signature from the wrong secret
    let resp = client
        .post(format!("{base_url}/api/stripe/webhook"))
        .header(
            "stripe-signature",
            stripe_signature(&payload, "whsec_nem_a_jo_titok"),
        )
        .body(payload)
        .send()
        .await
        .expect("Failed to post webhook");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
