//! Coupon validation endpoint.
//!
//! Validation is read-only: nothing is reserved or counted, the same code
//! can be checked any number of times. The authoritative discount is
//! recomputed again at checkout.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Body for `POST /api/coupon/validate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub code: String,
    /// Cart subtotal the discount would apply to, in forints.
    pub subtotal: i64,
}

/// Response for coupon validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_huf: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidateResponse {
    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            code: None,
            discount_huf: None,
            kind: None,
            value: None,
            message: Some(message.to_string()),
        }
    }
}

/// `POST /api/coupon/validate` - check a code against the current subtotal.
///
/// The lookup is case-insensitive; the CMS query already filters to active
/// coupons, expiry is checked here.
#[instrument(skip(state, body), fields(code = %body.code))]
pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let code = body.code.trim();
    if code.is_empty() {
        return Ok(Json(ValidateResponse::invalid("Hiányzó kuponkód")));
    }

    let Some(coupon) = state.sanity().get_coupon(code).await? else {
        return Ok(Json(ValidateResponse::invalid("Érvénytelen kuponkód")));
    };

    if !coupon.is_redeemable(Utc::now()) {
        return Ok(Json(ValidateResponse::invalid("A kupon lejárt")));
    }

    let discount = coupon.discount_for(body.subtotal.max(0));
    Ok(Json(ValidateResponse {
        valid: true,
        code: Some(coupon.code.clone()),
        discount_huf: Some(discount),
        kind: Some(
            match coupon.kind {
                wellcomp_core::CouponKind::Percent => "percent",
                wellcomp_core::CouponKind::Amount => "amount",
            }
            .to_string(),
        ),
        value: Some(coupon.value),
        message: None,
    }))
}
