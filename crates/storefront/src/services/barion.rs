//! Barion Payment Gateway client.
//!
//! Covers the two calls the storefront needs: `/v2/Payment/Start` to open a
//! hosted payment and `/v2/Payment/GetPaymentState` to poll its outcome.
//! Barion's API uses PascalCase JSON throughout.
//!
//! Confirmation is client-polled: the browser lands back on the redirect URL
//! and the frontend keeps calling the state endpoint until the payment
//! resolves. There is no inbound Barion webhook in this flow.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::BarionConfig;

/// Statuses Barion reports that we treat as a successful payment,
/// compared case-insensitively at both payment and transaction level.
const SUCCESS_STATUSES: &[&str] = &["succeeded", "completed"];

/// Errors that can occur when interacting with the Barion API.
#[derive(Debug, Error)]
pub enum BarionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Payment was created but the response lacked a gateway URL.
    #[error("Payment response missing gateway URL")]
    MissingGatewayUrl,
}

/// One purchasable item on the Barion payment sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BarionItem {
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub unit: String,
    pub unit_price: i64,
    pub item_total: i64,
}

/// Everything needed to start a payment for one order.
#[derive(Debug, Clone)]
pub struct StartPayment {
    pub order_number: String,
    pub payer_email: String,
    /// Where Barion sends the browser after the payment attempt.
    pub redirect_url: String,
    pub items: Vec<BarionItem>,
    pub total_huf: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartRequestBody<'a> {
    #[serde(rename = "POSKey")]
    pos_key: &'a str,
    payment_type: &'a str,
    guest_check_out: bool,
    funding_sources: &'a [&'a str],
    payment_request_id: &'a str,
    payer_hint: &'a str,
    locale: &'a str,
    currency: &'a str,
    redirect_url: &'a str,
    transactions: Vec<StartTransaction<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartTransaction<'a> {
    #[serde(rename = "POSTransactionId")]
    pos_transaction_id: &'a str,
    payee: &'a str,
    total: i64,
    items: &'a [BarionItem],
}

/// Response from `/v2/Payment/Start`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartedPayment {
    pub payment_id: String,
    #[serde(default)]
    pub gateway_url: Option<String>,
}

/// Response from `/v2/Payment/GetPaymentState`, reduced to what the
/// reconciliation path needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentState {
    pub payment_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub transactions: Vec<TransactionState>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionState {
    #[serde(default)]
    pub status: String,
}

impl PaymentState {
    /// Whether the provider considers this payment successfully completed.
    ///
    /// Matches either the payment-level status or the single transaction's
    /// status against the accepted success values, case-insensitively.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        let matches_success =
            |s: &str| SUCCESS_STATUSES.iter().any(|ok| s.eq_ignore_ascii_case(ok));

        if matches_success(&self.status) {
            return true;
        }
        if let [only] = self.transactions.as_slice() {
            return matches_success(&only.status);
        }
        false
    }
}

/// Barion API client.
#[derive(Clone)]
pub struct BarionClient {
    client: reqwest::Client,
    base_url: String,
    pos_key: String,
    payee: String,
}

impl BarionClient {
    /// Create a new Barion client.
    #[must_use]
    pub fn new(config: &BarionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            pos_key: config.pos_key.expose_secret().to_string(),
            payee: config.payee.clone(),
        }
    }

    /// Start an immediate HUF payment for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the request or the response lacks
    /// the hosted gateway URL.
    #[instrument(skip(self, payment), fields(order_number = %payment.order_number))]
    pub async fn start_payment(&self, payment: &StartPayment) -> Result<StartedPayment, BarionError> {
        let body = StartRequestBody {
            pos_key: &self.pos_key,
            payment_type: "Immediate",
            guest_check_out: true,
            funding_sources: &["All"],
            payment_request_id: &payment.order_number,
            payer_hint: &payment.payer_email,
            locale: "hu-HU",
            currency: "HUF",
            redirect_url: &payment.redirect_url,
            transactions: vec![StartTransaction {
                pos_transaction_id: &payment.order_number,
                payee: &self.payee,
                total: payment.total_huf,
                items: &payment.items,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v2/Payment/Start", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BarionError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let started: StartedPayment = response.json().await?;
        if started.gateway_url.is_none() {
            return Err(BarionError::MissingGatewayUrl);
        }
        Ok(started)
    }

    /// Poll the current state of a payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_payment_state(&self, payment_id: &str) -> Result<PaymentState, BarionError> {
        let response = self
            .client
            .get(format!("{}/v2/Payment/GetPaymentState", self.base_url))
            .query(&[("POSKey", self.pos_key.as_str()), ("PaymentId", payment_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BarionError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: &str, tx_statuses: &[&str]) -> PaymentState {
        PaymentState {
            payment_id: "pay-1".to_string(),
            status: status.to_string(),
            transactions: tx_statuses
                .iter()
                .map(|s| TransactionState {
                    status: (*s).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn payment_level_success_is_detected_case_insensitively() {
        assert!(state("Succeeded", &[]).is_succeeded());
        assert!(state("COMPLETED", &[]).is_succeeded());
        assert!(!state("Prepared", &[]).is_succeeded());
        assert!(!state("Canceled", &[]).is_succeeded());
    }

    #[test]
    fn single_transaction_success_counts() {
        assert!(state("Started", &["Succeeded"]).is_succeeded());
    }

    #[test]
    fn multiple_transactions_never_imply_success() {
        // Only the single-transaction shape is trusted at transaction level.
        assert!(!state("Started", &["Succeeded", "Succeeded"]).is_succeeded());
    }

    #[test]
    fn empty_state_is_not_success() {
        assert!(!state("", &[]).is_succeeded());
    }
}
