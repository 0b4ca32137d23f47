//! Account route handlers: saved shipping addresses.
//!
//! Every handler requires a session user, and every address mutation is
//! ownership-checked against the CMS before it runs. Setting a default
//! clears the flag on the user's other addresses with separate patches;
//! there is no cross-document transaction, so a crash mid-way can leave two
//! defaults until the next set-default call.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::sanity::types::{AddressDoc, AddressFields};
use crate::state::AppState;

/// `GET /api/account/addresses` - list the user's saved addresses.
#[instrument(skip_all)]
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<AddressDoc>>> {
    Ok(Json(state.sanity().list_addresses(&user.id).await?))
}

/// `POST /api/account/addresses` - save a new address.
#[instrument(skip_all)]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(fields): Json<AddressFields>,
) -> Result<Json<Value>> {
    validate_address(&fields)?;
    let id = state.sanity().create_address(&user.id, &fields).await?;
    Ok(Json(json!({ "id": id })))
}

/// `PUT /api/account/addresses/{id}` - update a saved address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(fields): Json<AddressFields>,
) -> Result<Json<Value>> {
    validate_address(&fields)?;
    require_ownership(&state, &user.id, &id).await?;
    state.sanity().update_address(&id, &fields).await?;
    Ok(Json(json!({ "id": id })))
}

/// `DELETE /api/account/addresses/{id}` - delete a saved address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    require_ownership(&state, &user.id, &id).await?;
    state.sanity().delete_address(&id).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// `POST /api/account/addresses/{id}/default` - mark one address as the
/// default, clearing the flag everywhere else.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    require_ownership(&state, &user.id, &id).await?;

    // Clear first, then set: if interrupted, the user ends up with no
    // default rather than two.
    for address in state.sanity().list_addresses(&user.id).await? {
        if address.is_default && address.id != id {
            state.sanity().set_address_default(&address.id, false).await?;
        }
    }
    state.sanity().set_address_default(&id, true).await?;

    Ok(Json(json!({ "id": id, "isDefault": true })))
}

/// 404 unless the address exists and belongs to the user. Not-found and
/// not-yours are indistinguishable on purpose.
async fn require_ownership(
    state: &AppState,
    user_id: &wellcomp_core::UserId,
    address_id: &str,
) -> Result<()> {
    state
        .sanity()
        .get_address(user_id, address_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(address_id.to_string()))
}

fn validate_address(fields: &AddressFields) -> Result<()> {
    for (value, name) in [
        (&fields.zip, "irányítószám"),
        (&fields.city, "város"),
        (&fields.street, "utca, házszám"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("Hiányzó mező: {name}")));
        }
    }
    Ok(())
}
