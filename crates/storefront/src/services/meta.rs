//! Meta Conversions API relay.
//!
//! The browser posts pixel events to the storefront instead of straight to
//! Meta, so PII never leaves our domain unhashed. The relay normalizes and
//! SHA-256 hashes identifying fields, attaches the client IP and user agent,
//! and forwards the event to the Graph API.
//!
//! Only allow-listed event names are forwarded; anything else is rejected
//! before touching the provider.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::config::MetaConfig;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Event names the relay accepts from the browser.
pub const ALLOWED_EVENTS: &[&str] = &[
    "PageView",
    "ViewContent",
    "AddToCart",
    "InitiateCheckout",
    "Purchase",
    "Lead",
    "CompleteRegistration",
];

/// Errors that can occur when forwarding events.
#[derive(Debug, Error)]
pub enum MetaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Event payload as posted by the browser.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserEvent {
    pub event_name: String,
    pub event_id: String,
    pub source_url: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl BrowserEvent {
    /// Whether the event name is on the relay allow-list.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        ALLOWED_EVENTS.contains(&self.event_name.as_str())
    }
}

#[derive(Serialize)]
struct EventsRequest<'a> {
    data: [GraphEvent<'a>; 1],
}

#[derive(Serialize)]
struct GraphEvent<'a> {
    event_name: &'a str,
    event_time: i64,
    event_id: &'a str,
    event_source_url: &'a str,
    action_source: &'static str,
    user_data: UserData,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_data: Option<CustomData<'a>>,
}

#[derive(Serialize)]
struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    em: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ph: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ct: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    st: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db: Option<[String; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_user_agent: Option<String>,
}

#[derive(Serialize)]
struct CustomData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<&'a str>,
}

/// Normalize and SHA-256 hash a PII field the way the Conversions API
/// expects: trimmed, lowercased, hex-encoded digest.
#[must_use]
pub fn hash_pii(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

fn hashed(value: Option<&str>) -> Option<[String; 1]> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| [hash_pii(v)])
}

/// Meta Conversions API client.
#[derive(Clone)]
pub struct MetaClient {
    client: reqwest::Client,
    pixel_id: String,
    access_token: String,
}

impl MetaClient {
    /// Create a new Conversions API client.
    #[must_use]
    pub fn new(config: &MetaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            pixel_id: config.pixel_id.clone(),
            access_token: config.access_token.expose_secret().to_string(),
        }
    }

    /// Forward one browser event, hashing its PII fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the Graph API request fails.
    #[instrument(skip(self, event, client_ip, user_agent), fields(event_name = %event.event_name))]
    pub async fn send_event(
        &self,
        event: &BrowserEvent,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<(), MetaError> {
        let body = EventsRequest {
            data: [GraphEvent {
                event_name: &event.event_name,
                event_time: chrono::Utc::now().timestamp(),
                event_id: &event.event_id,
                event_source_url: &event.source_url,
                action_source: "website",
                user_data: UserData {
                    em: hashed(event.email.as_deref()),
                    ph: hashed(event.phone.as_deref()),
                    ct: hashed(event.city.as_deref()),
                    st: hashed(event.region.as_deref()),
                    country: hashed(event.country.as_deref()),
                    db: hashed(event.date_of_birth.as_deref()),
                    client_ip_address: client_ip,
                    client_user_agent: user_agent,
                },
                custom_data: event.value.map(|value| CustomData {
                    value: Some(value),
                    currency: event.currency.as_deref(),
                }),
            }],
        };

        let response = self
            .client
            .post(format!("{GRAPH_API_BASE}/{}/events", self.pixel_id))
            .query(&[("access_token", self.access_token.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetaError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_normalizes_case_and_whitespace() {
        assert_eq!(hash_pii(" Vasarlo@Example.HU "), hash_pii("vasarlo@example.hu"));
        // Known SHA-256 of "test@example.com"
        assert_eq!(
            hash_pii("test@example.com"),
            "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b"
        );
    }

    #[test]
    fn empty_pii_fields_are_omitted_not_hashed() {
        assert_eq!(hashed(Some("   ")), None);
        assert_eq!(hashed(None), None);
        assert!(hashed(Some("Budapest")).is_some());
    }

    #[test]
    fn allow_list_gates_event_names() {
        let mut event = BrowserEvent {
            event_name: "Purchase".to_string(),
            event_id: "evt-1".to_string(),
            source_url: "https://wellcomp.hu/kosar".to_string(),
            value: Some(129_990.0),
            currency: Some("HUF".to_string()),
            email: None,
            phone: None,
            city: None,
            region: None,
            country: None,
            date_of_birth: None,
        };
        assert!(event.is_allowed());

        event.event_name = "ArbitraryCustomEvent".to_string();
        assert!(!event.is_allowed());
    }
}
