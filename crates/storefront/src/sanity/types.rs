//! Typed Sanity documents as projected by the GROQ queries in
//! [`super::queries`].
//!
//! Field names follow the CMS schema (camelCase). Projections flatten the
//! CMS-specific shapes (`slug.current`, image asset references) so the rest
//! of the codebase never sees raw document internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wellcomp_core::{Coupon, Discount, OrderLine, OrderStatus, ResolvedPrice, resolve_price};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// Base price in forints, before any discount.
    pub price_huf: i64,
    #[serde(default)]
    pub discounts: Vec<Discount>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specs: Vec<SpecPair>,
}

impl ProductDoc {
    /// Run the base price through the best-discount-wins resolver.
    #[must_use]
    pub fn resolved_price(&self) -> ResolvedPrice {
        resolve_price(self.price_huf, &self.discounts)
    }

    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Flattened spec key/value pair (e.g. "CPU" / "Ryzen 7 7840HS").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecPair {
    pub key: String,
    pub value: String,
}

/// Coupon projection. Deserializes straight into the core [`Coupon`].
pub type CouponDoc = Coupon;

/// Shipping address embedded on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub zip: String,
    pub city: String,
    pub street: String,
}

/// An order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub email: String,
    pub customer_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_huf: i64,
    #[serde(default)]
    pub discount_huf: i64,
    pub total_huf: i64,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment_provider: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new order document (no `_id` yet; status is always
/// `MEGRENDELVE` at creation).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: String,
    pub email: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub shipping_address: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub shipping_huf: i64,
    pub discount_huf: i64,
    pub total_huf: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub reset_token_hash: Option<String>,
    #[serde(default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

/// A saved address, stored as its own document referencing the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub zip: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Fields for creating or updating an address document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub zip: String,
    pub city: String,
    pub street: String,
}
