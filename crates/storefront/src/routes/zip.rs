//! Postal code lookup endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;

/// Query parameters for `GET /api/zip`.
#[derive(Debug, Deserialize)]
pub struct ZipQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/zip?q=1011` - resolve a postal code to its city.
///
/// Unknown or malformed input answers `{"city": null}` rather than an
/// error; the frontend treats it as "nothing to autofill".
#[instrument(skip(state))]
pub async fn lookup(State(state): State<AppState>, Query(params): Query<ZipQuery>) -> Json<Value> {
    let city = state.zip_codes().lookup(&params.q);
    Json(json!({ "city": city }))
}
