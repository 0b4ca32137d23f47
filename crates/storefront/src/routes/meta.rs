//! Meta Conversions API relay endpoint.
//!
//! Tracking must never break the shop: after the allow-list check the
//! handler always answers 200, logging upstream failures instead of
//! surfacing them. When the relay is not configured events are accepted and
//! discarded.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::rate_limit::client_ip;
use crate::services::meta::BrowserEvent;
use crate::state::AppState;

/// `POST /api/meta/event` - hash and forward one browser pixel event.
#[instrument(skip(state, headers, event), fields(event_name = %event.event_name))]
pub async fn relay_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<BrowserEvent>,
) -> Result<Json<Value>> {
    if !event.is_allowed() {
        return Err(AppError::BadRequest(format!(
            "Event not allowed: {}",
            event.event_name
        )));
    }

    let Some(meta) = state.meta() else {
        tracing::debug!("Conversions relay not configured, dropping event");
        return Ok(Json(json!({ "received": true, "forwarded": false })));
    };

    let ip = client_ip(&headers).map(|ip| ip.to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Err(e) = meta.send_event(&event, ip, user_agent).await {
        tracing::error!("Conversions API forward failed: {e}");
        sentry::capture_error(&e);
        return Ok(Json(json!({ "received": true, "forwarded": false })));
    }

    Ok(Json(json!({ "received": true, "forwarded": true })))
}
