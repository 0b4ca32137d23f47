//! Checkout: turning a cart into an order document.
//!
//! The order is created with status `MEGRENDELVE` before any payment starts.
//! Amounts are computed server-side from the live catalog; the client's
//! price snapshots are never trusted.

use axum::{Json, extract::State, http::HeaderMap};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wellcomp_core::{Email, OrderLine};

use crate::error::{AppError, Result};
use crate::routes::cart::{parse_cart, sanitize_upgrades};
use crate::sanity::types::{NewOrder, ShippingAddress};
use crate::state::AppState;

/// Flat shipping fee in forints.
const SHIPPING_FEE_HUF: i64 = 2_990;

/// Subtotal at or above which shipping is free.
const FREE_SHIPPING_THRESHOLD_HUF: i64 = 50_000;

/// Body for `POST /api/checkout/order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub zip: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Response for a created order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub order_number: String,
    pub subtotal_huf: i64,
    pub discount_huf: i64,
    pub shipping_huf: i64,
    pub total_huf: i64,
}

/// `POST /api/checkout/order` - create an order from the cart cookie.
#[instrument(skip(state, headers, body), fields(email = %body.email))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::BadRequest(format!("Hibás e-mail cím: {e}")))?;
    validate_required(&body.name, "név")?;
    validate_required(&body.zip, "irányítószám")?;
    validate_required(&body.city, "város")?;
    validate_required(&body.street, "utca, házszám")?;

    // Re-resolve every line against the catalog; client snapshots are only a
    // hint of what was in the cart.
    let cart = parse_cart(&headers);
    let mut lines: Vec<OrderLine> = Vec::with_capacity(cart.items.len());
    let mut subtotal: i64 = 0;

    for item in &cart.items {
        let Some(product) = state.sanity().get_product(&item.slug).await? else {
            continue;
        };
        let resolved = product.resolved_price();
        if resolved.invalid {
            continue;
        }

        let line = OrderLine {
            slug: product.slug.clone(),
            name: product.name.clone(),
            quantity: item.quantity,
            unit_price_huf: resolved.final_huf,
            upgrades: sanitize_upgrades(item.upgrades.clone(), &item.slug),
        };
        subtotal += line.line_total_huf();
        lines.push(line);
    }

    if lines.is_empty() {
        return Err(AppError::BadRequest("A kosár üres".to_string()));
    }

    let discount = match body.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let coupon = state
                .sanity()
                .get_coupon(code)
                .await?
                .filter(|c| c.is_redeemable(chrono::Utc::now()))
                .ok_or_else(|| AppError::BadRequest("Érvénytelen kuponkód".to_string()))?;
            coupon.discount_for(subtotal)
        }
        _ => 0,
    };

    let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD_HUF {
        0
    } else {
        SHIPPING_FEE_HUF
    };
    let total = subtotal - discount + shipping;

    let order = NewOrder {
        order_number: generate_order_number(),
        email: email.into_inner(),
        customer_name: body.name.trim().to_string(),
        phone: body.phone.filter(|p| !p.trim().is_empty()),
        shipping_address: ShippingAddress {
            zip: body.zip.trim().to_string(),
            city: body.city.trim().to_string(),
            street: body.street.trim().to_string(),
        },
        lines,
        shipping_huf: shipping,
        discount_huf: discount,
        total_huf: total,
        coupon_code: body
            .coupon_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty()),
    };

    let order_number = order.order_number.clone();
    let order_id = state.sanity().create_order(&order).await?;
    tracing::info!(order_number = %order_number, "Order created");

    Ok(Json(CheckoutResponse {
        order_id: order_id.into_inner(),
        order_number,
        subtotal_huf: subtotal,
        discount_huf: discount,
        shipping_huf: shipping,
        total_huf: total,
    }))
}

fn validate_required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("Hiányzó mező: {field}")));
    }
    Ok(())
}

/// Order numbers are `WC-YYYYMMDD-XXXX` with a random hex suffix. Uniqueness
/// is probabilistic; the CMS document id is the real identifier.
fn generate_order_number() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: u16 = rand::rng().random();
    format!("WC-{date}-{suffix:04X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_shape() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "WC");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn required_field_validation() {
        assert!(validate_required("Budapest", "város").is_ok());
        assert!(validate_required("  ", "város").is_err());
    }
}
