//! Barion payment route handlers.
//!
//! Barion has no inbound webhook in this flow: after the hosted payment the
//! browser returns to the frontend, which polls the state endpoint until the
//! payment resolves. Settlement therefore happens inside the poll handler,
//! guarded by the settlement service's status check so repeated polls settle
//! at most once.
//!
//! Poll responses stay 200-shaped even when the provider or the CMS
//! misbehaves; an error page mid-payment would strand paying customers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use wellcomp_core::OrderId;

use crate::error::{AppError, Result};
use crate::services::barion::{BarionItem, StartPayment};
use crate::services::settlement::PaymentProvider;
use crate::state::AppState;

/// Body for `POST /api/barion/start`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub order_id: String,
}

/// Response for a started payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub redirect_url: String,
    pub payment_id: String,
}

/// `POST /api/barion/start` - open a hosted Barion payment for an order.
///
/// Amounts and items come from the order document, not the request.
#[instrument(skip(state, body), fields(order_id = %body.order_id))]
pub async fn start(
    State(state): State<AppState>,
    Json(body): Json<StartRequest>,
) -> Result<Json<StartResponse>> {
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

    let mut items: Vec<BarionItem> = order
        .lines
        .iter()
        .map(|line| BarionItem {
            name: line.name.clone(),
            description: line.name.clone(),
            quantity: line.quantity,
            unit: "db".to_string(),
            unit_price: line.line_total_huf() / i64::from(line.quantity.max(1)),
            item_total: line.line_total_huf(),
        })
        .collect();

    // Shipping and discount ride along as adjustment items so the sheet
    // total matches the order total exactly.
    if order.shipping_huf > 0 {
        items.push(adjustment_item("Szállítás", order.shipping_huf));
    }
    if order.discount_huf > 0 {
        items.push(adjustment_item("Kedvezmény", -order.discount_huf));
    }

    let started = state
        .barion()
        .start_payment(&StartPayment {
            order_number: order.order_number.clone(),
            payer_email: order.email.clone(),
            redirect_url: format!("{}/fizetes/visszateres", state.config().frontend_url),
            items,
            total_huf: order.total_huf,
        })
        .await?;

    state
        .sanity()
        .set_order_payment(&order_id, PaymentProvider::Barion.as_str(), &started.payment_id)
        .await?;

    let redirect_url = started
        .gateway_url
        .ok_or_else(|| AppError::Internal("Barion gateway URL missing".to_string()))?;

    Ok(Json(StartResponse {
        redirect_url,
        payment_id: started.payment_id,
    }))
}

fn adjustment_item(name: &str, amount_huf: i64) -> BarionItem {
    BarionItem {
        name: name.to_string(),
        description: name.to_string(),
        quantity: 1,
        unit: "db".to_string(),
        unit_price: amount_huf,
        item_total: amount_huf,
    }
}

/// Query parameters for the polling endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub payment_id: String,
}

/// `GET /api/barion/state?paymentId=` - poll the provider and settle on
/// success.
///
/// Settlement failures are logged and swallowed: the payment already
/// happened, and the back office can reconcile from the provider dashboard.
#[instrument(skip(state), fields(payment_id = %params.payment_id))]
pub async fn state(
    State(state): State<AppState>,
    Query(params): Query<PaymentQuery>,
) -> Json<Value> {
    let payment_state = match state.barion().get_payment_state(&params.payment_id).await {
        Ok(payment_state) => payment_state,
        Err(e) => {
            tracing::error!("Barion state poll failed: {e}");
            sentry::capture_error(&e);
            return Json(json!({ "paid": false, "status": "Unknown" }));
        }
    };

    let paid = payment_state.is_succeeded();
    if paid {
        settle_by_payment_id(&state, &params.payment_id).await;
    }

    Json(json!({ "paid": paid, "status": payment_state.status }))
}

/// Resolve the order behind a payment ID and run settlement, logging any
/// failure without surfacing it.
async fn settle_by_payment_id(state: &AppState, payment_id: &str) {
    let order = match state.sanity().get_order_by_payment_id(payment_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            tracing::error!("No order found for confirmed Barion payment");
            return;
        }
        Err(e) => {
            tracing::error!("Order lookup for Barion settlement failed: {e}");
            sentry::capture_error(&e);
            return;
        }
    };

    if let Err(e) = state
        .settlement()
        .settle(&OrderId::new(order.id), PaymentProvider::Barion, payment_id)
        .await
    {
        tracing::error!("Barion settlement failed: {e}");
        sentry::capture_error(&e);
    }
}

/// `GET /api/barion/order-status?paymentId=` - cheap status poll against the
/// CMS only, no provider call.
#[instrument(skip(state), fields(payment_id = %params.payment_id))]
pub async fn order_status(
    State(state): State<AppState>,
    Query(params): Query<PaymentQuery>,
) -> Result<Json<Value>> {
    let order = state
        .sanity()
        .get_order_by_payment_id(&params.payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(params.payment_id.clone()))?;

    Ok(Json(json!({
        "orderNumber": order.order_number,
        "status": order.status.as_str(),
        "paid": order.status.is_paid(),
    })))
}
