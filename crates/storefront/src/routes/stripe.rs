//! Stripe payment route handlers.
//!
//! The webhook is the settlement trigger: Stripe POSTs the raw event, the
//! signature is verified on the untouched bytes, and
//! `checkout.session.completed` runs the shared settlement service. After a
//! valid signature the response is always `{"received": true}` - returning
//! errors for our own downstream failures would only make Stripe retry a
//! payment that already succeeded.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use wellcomp_core::OrderId;

use crate::error::{AppError, Result};
use crate::services::settlement::PaymentProvider;
use crate::services::stripe::{StripeClient, StripeLineItem};
use crate::state::AppState;

/// Body for `POST /api/stripe/checkout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub order_id: String,
}

/// Response for a created Checkout Session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
}

/// `POST /api/stripe/checkout` - create a hosted Checkout Session for an
/// order.
#[instrument(skip(state, body), fields(order_id = %body.order_id))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let order_id = OrderId::new(body.order_id);
    let order = state
        .sanity()
        .get_order(&order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(order_id.to_string()))?;

    if order.status.is_paid() {
        return Err(AppError::BadRequest(
            "A rendelés már ki van fizetve".to_string(),
        ));
    }

    // Stripe line items cannot be negative, so a coupon discount cannot be
    // itemized the way Barion takes it. Discounted orders are charged as a
    // single line for the order total instead.
    let items: Vec<StripeLineItem> = if order.discount_huf > 0 {
        vec![StripeLineItem {
            name: format!("Rendelés {}", order.order_number),
            unit_amount_huf: order.total_huf,
            quantity: 1,
        }]
    } else {
        let mut items: Vec<StripeLineItem> = order
            .lines
            .iter()
            .map(|line| StripeLineItem {
                name: line.name.clone(),
                unit_amount_huf: line.line_total_huf() / i64::from(line.quantity.max(1)),
                quantity: line.quantity,
            })
            .collect();

        if order.shipping_huf > 0 {
            items.push(StripeLineItem {
                name: "Szállítás".to_string(),
                unit_amount_huf: order.shipping_huf,
                quantity: 1,
            });
        }
        items
    };

    let frontend = &state.config().frontend_url;
    let session = state
        .stripe()
        .create_checkout_session(
            order_id.as_str(),
            &order.email,
            &items,
            &format!("{frontend}/fizetes/siker?session_id={{CHECKOUT_SESSION_ID}}"),
            &format!("{frontend}/kosar"),
        )
        .await?;

    state
        .sanity()
        .set_order_payment(&order_id, PaymentProvider::Stripe.as_str(), &session.id)
        .await?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
    }))
}

/// `POST /api/stripe/webhook` - signature-verified settlement trigger.
///
/// 400 is returned only for missing/invalid signatures and unparseable
/// bodies. Everything after verification is acknowledged.
#[instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    state
        .stripe()
        .verify_webhook_signature(&body, signature)
        .map_err(|e| {
            tracing::warn!("Stripe webhook signature rejected: {e}");
            AppError::BadRequest("Invalid signature".to_string())
        })?;

    let event = StripeClient::parse_event(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event: {e}")))?;

    if event.event_type == "checkout.session.completed" {
        match event.order_id() {
            Some(order_id) => {
                let session_id = event.data.object.id.clone();
                if let Err(e) = state
                    .settlement()
                    .settle(&OrderId::new(order_id), PaymentProvider::Stripe, &session_id)
                    .await
                {
                    tracing::error!(event_id = %event.id, "Stripe settlement failed: {e}");
                    sentry::capture_error(&e);
                }
            }
            None => {
                tracing::error!(event_id = %event.id, "Completed session carries no order id");
            }
        }
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignoring Stripe event");
    }

    Ok(Json(json!({ "received": true })))
}
