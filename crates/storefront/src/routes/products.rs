//! Catalog route handlers.
//!
//! Thin JSON projections over the cached CMS catalog: every price goes
//! through the discount resolver before it reaches the client, so the
//! frontend never sees raw discount data.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::sanity::types::ProductDoc;
use crate::state::AppState;

/// One catalog entry as listed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub slug: String,
    pub name: String,
    pub brand: String,
    /// Resolved (possibly discounted) price in forints.
    pub price_huf: i64,
    /// Base price, present only when a discount applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_huf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub in_stock: bool,
}

impl From<&ProductDoc> for ProductSummary {
    fn from(doc: &ProductDoc) -> Self {
        let resolved = doc.resolved_price();
        Self {
            slug: doc.slug.clone(),
            name: doc.name.clone(),
            brand: doc.brand.clone(),
            price_huf: resolved.final_huf,
            compare_at_huf: resolved.compare_at_huf,
            image: doc.first_image().map(String::from),
            category: doc.category.clone(),
            in_stock: doc.stock > 0,
        }
    }
}

/// `GET /api/products` - the published catalog with resolved prices.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>> {
    let products = state.sanity().list_products().await?;
    Ok(Json(products.iter().map(ProductSummary::from).collect()))
}

/// `GET /api/products/{slug}` - full product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let product = state
        .sanity()
        .get_product(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;

    let resolved = product.resolved_price();
    Ok(Json(json!({
        "slug": product.slug,
        "name": product.name,
        "brand": product.brand,
        "priceHuf": resolved.final_huf,
        "compareAtHuf": resolved.compare_at_huf,
        "images": product.images,
        "category": product.category,
        "description": product.description,
        "specs": product.specs,
        "inStock": product.stock > 0,
    })))
}
