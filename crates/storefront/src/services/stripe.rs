//! Stripe client: Checkout Session creation and webhook verification.
//!
//! Sessions are created against the form-encoded `/v1/checkout/sessions`
//! endpoint. Webhooks are verified manually: the `Stripe-Signature` header
//! carries a timestamp and an HMAC-SHA256 of `"{timestamp}.{raw body}"`
//! keyed with the endpoint's signing secret. Verification must run on the
//! raw bytes, before any JSON parsing.

use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use crate::config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

const API_BASE: &str = "https://api.stripe.com";

/// Maximum accepted age of a webhook timestamp, in seconds.
/// Guards against replay of captured payloads.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors that can occur when interacting with Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Webhook signature header is missing required parts.
    #[error("Malformed signature header")]
    MalformedSignature,

    /// Webhook signature did not match the payload.
    #[error("Signature verification failed")]
    InvalidSignature,

    /// Webhook timestamp is outside the accepted tolerance.
    #[error("Signature timestamp outside tolerance")]
    TimestampOutOfTolerance,

    /// Failed to parse a response or event body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One line item for a Checkout Session.
#[derive(Debug, Clone)]
pub struct StripeLineItem {
    pub name: String,
    pub unit_amount_huf: i64,
    pub quantity: u32,
}

/// A created Checkout Session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A parsed webhook event, reduced to the fields the storefront uses.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub metadata: WebhookMetadata,
    #[serde(default)]
    pub client_reference_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMetadata {
    #[serde(default)]
    pub order_id: Option<String>,
}

impl WebhookEvent {
    /// The order this event settles, from metadata or the client reference.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.data
            .object
            .metadata
            .order_id
            .as_deref()
            .or(self.data.object.client_reference_id.as_deref())
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.expose_secret().to_string(),
            webhook_secret: config.webhook_secret.expose_secret().to_string(),
        }
    }

    /// Create a hosted Checkout Session for an order.
    ///
    /// The order ID travels in both `metadata[orderId]` and
    /// `client_reference_id` so the webhook can settle the right order even
    /// if one of them is stripped somewhere along the way.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request.
    #[instrument(skip(self, items, customer_email), fields(order_id = %order_id))]
    pub async fn create_checkout_session(
        &self,
        order_id: &str,
        customer_email: &str,
        items: &[StripeLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            ("customer_email".to_string(), customer_email.to_string()),
            ("client_reference_id".to_string(), order_id.to_string()),
            ("metadata[orderId]".to_string(), order_id.to_string()),
        ];

        for (i, item) in items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                "huf".to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            // Stripe expects the smallest currency unit; HUF is zero-decimal
            // on Stripe's side but the amount parameter is still * 100.
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                (item.unit_amount_huf * 100).to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let response = self
            .client
            .post(format!("{API_BASE}/v1/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(response.json().await?)
    }

    /// Verify a webhook payload against its `Stripe-Signature` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed, the timestamp is outside
    /// tolerance, or the signature does not match.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), StripeError> {
        verify_signature_at(
            payload,
            signature_header,
            &self.webhook_secret,
            chrono::Utc::now().timestamp(),
        )
    }

    /// Parse a verified webhook payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a well-formed event.
    pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, StripeError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Signature verification with an injectable clock, for tests.
pub(crate) fn verify_signature_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), StripeError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(StripeError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(StripeError::MalformedSignature);
    }

    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(StripeError::TimestampOutOfTolerance);
    }

    for signature in &signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| StripeError::MalformedSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice is constant-time
        if mac.verify_slice(signature).is_ok() {
            return Ok(());
        }
    }

    Err(StripeError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("key");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, SECRET, now));
        assert!(verify_signature_at(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, "wrong_secret", now));
        assert!(matches!(
            verify_signature_at(payload, &header, SECRET, now),
            Err(StripeError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = br#"{"amount":1000}"#;
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", sign(payload, SECRET, now));
        let tampered = br#"{"amount":9999}"#;
        assert!(verify_signature_at(tampered, &header, SECRET, now).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = b"{}";
        let signed_at = 1_700_000_000;
        let header = format!("t={signed_at},v1={}", sign(payload, SECRET, signed_at));
        let now = signed_at + SIGNATURE_TOLERANCE_SECS + 1;
        assert!(matches!(
            verify_signature_at(payload, &header, SECRET, now),
            Err(StripeError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn missing_parts_are_malformed() {
        let payload = b"{}";
        let now = 1_700_000_000;
        assert!(matches!(
            verify_signature_at(payload, "t=1700000000", SECRET, now),
            Err(StripeError::MalformedSignature)
        ));
        assert!(matches!(
            verify_signature_at(payload, "v1=deadbeef", SECRET, now),
            Err(StripeError::MalformedSignature)
        ));
        assert!(matches!(
            verify_signature_at(payload, "", SECRET, now),
            Err(StripeError::MalformedSignature)
        ));
    }

    #[test]
    fn second_valid_v1_entry_is_accepted() {
        // Stripe sends multiple v1 entries during secret rotation.
        let payload = b"{}";
        let now = 1_700_000_000;
        let header = format!(
            "t={now},v1={},v1={}",
            sign(payload, "old_secret", now),
            sign(payload, SECRET, now)
        );
        assert!(verify_signature_at(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn event_order_id_prefers_metadata() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_1",
                "metadata": { "orderId": "order-a" },
                "client_reference_id": "order-b"
            } }
        }"#;
        let event = StripeClient::parse_event(payload).expect("parse");
        assert_eq!(event.order_id(), Some("order-a"));
    }

    #[test]
    fn event_order_id_falls_back_to_client_reference() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_1", "client_reference_id": "order-b" } }
        }"#;
        let event = StripeClient::parse_event(payload).expect("parse");
        assert_eq!(event.order_id(), Some("order-b"));
    }
}
