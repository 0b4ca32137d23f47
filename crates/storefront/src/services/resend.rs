//! Transactional email over the Resend API.
//!
//! Two kinds of mail leave the storefront: order confirmations (customer
//! copy + internal copy) and password reset links. HTML bodies are built
//! inline; there is no marketing templating here.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::ResendConfig;
use crate::sanity::types::OrderDoc;

const BASE_URL: &str = "https://api.resend.com";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum ResendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API key could not be used as a header value.
    #[error("Invalid API key format")]
    InvalidApiKey,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Resend API client for transactional email.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    from: String,
    internal_address: String,
}

impl ResendClient {
    /// Create a new Resend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ResendConfig) -> Result<Self, ResendError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value).map_err(|_| ResendError::InvalidApiKey)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            from: config.from.clone(),
            internal_address: config.internal_address.clone(),
        })
    }

    /// Send one email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, html), fields(to = %to, subject = %subject))]
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ResendError> {
        let response = self
            .client
            .post(format!("{BASE_URL}/emails"))
            .json(&SendRequest {
                from: &self.from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResendError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }
        Ok(())
    }

    /// Send the order confirmation to the customer and the internal copy,
    /// concurrently. Individual failures are logged and tolerated; the
    /// settlement outcome never depends on email delivery.
    pub async fn send_order_confirmation(&self, order: &OrderDoc) {
        let subject = format!("WELLCOMP rendelés visszaigazolás - {}", order.order_number);
        let html = order_confirmation_html(order);

        let internal_subject = format!("Új fizetett rendelés - {}", order.order_number);

        let (customer, internal) = tokio::join!(
            self.send(&order.email, &subject, &html),
            self.send(&self.internal_address, &internal_subject, &html),
        );

        if let Err(e) = customer {
            tracing::error!(order_number = %order.order_number, "Customer confirmation email failed: {e}");
        }
        if let Err(e) = internal {
            tracing::error!(order_number = %order.order_number, "Internal confirmation email failed: {e}");
        }
    }

    /// Send a password reset link.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<(), ResendError> {
        let html = format!(
            "<p>Új jelszó beállításához kattintson az alábbi linkre. \
             A link egy óráig érvényes.</p>\
             <p><a href=\"{reset_url}\">Új jelszó beállítása</a></p>\
             <p>Ha nem Ön kérte a jelszó módosítását, hagyja figyelmen kívül ezt a levelet.</p>"
        );
        self.send(to, "WELLCOMP - Jelszó visszaállítás", &html).await
    }
}

/// Render the order confirmation body shared by both copies.
fn order_confirmation_html(order: &OrderDoc) -> String {
    let mut rows = String::new();
    for line in &order.lines {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{} db</td><td>{} Ft</td></tr>",
            line.name,
            line.quantity,
            line.line_total_huf()
        ));
    }

    format!(
        "<h2>Köszönjük a rendelését!</h2>\
         <p>Rendelésszám: <strong>{}</strong></p>\
         <table><tr><th>Termék</th><th>Mennyiség</th><th>Összeg</th></tr>{rows}</table>\
         <p>Szállítás: {} Ft</p>\
         <p>Kedvezmény: {} Ft</p>\
         <p><strong>Fizetve: {} Ft</strong></p>",
        order.order_number, order.shipping_huf, order.discount_huf, order.total_huf
    )
}
