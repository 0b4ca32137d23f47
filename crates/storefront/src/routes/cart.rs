//! Cart route handlers and the cart cookie codec.
//!
//! The cart never touches server-side storage: the whole thing travels in
//! the `cart-json` cookie as base64url-encoded JSON. A companion
//! `cart-total-huf` cookie carries the plain total so the frontend can show
//! the header badge without decoding anything.
//!
//! Every operation recomputes the cart against the live catalog before
//! answering: price snapshots are refreshed through the discount resolver,
//! and lines whose product vanished or whose pricing is invalid are dropped
//! silently. Concurrent tabs follow last-write-wins; both cookies are always
//! rewritten together from one recomputed cart.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{AppendHeaders, IntoResponse},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use wellcomp_core::{Cart, CartItem, CartUpgrade};

use crate::error::{AppError, Result};
use crate::sanity::types::ProductDoc;
use crate::state::AppState;

/// Cookie holding the cart itself (HTTP-only).
pub const CART_COOKIE: &str = "cart-json";

/// Cookie holding the plain total, readable from JS.
pub const TOTAL_COOKIE: &str = "cart-total-huf";

/// Cart cookie lifetime: 30 days.
const CART_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Total cookie lifetime: 7 days.
const TOTAL_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

// =============================================================================
// Cookie codec
// =============================================================================

/// Read one cookie value from the `Cookie` header.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Decode the cart from request headers.
///
/// Any failure (missing cookie, bad base64, bad JSON) yields an empty cart;
/// a corrupted cookie must never break the storefront.
#[must_use]
pub fn parse_cart(headers: &HeaderMap) -> Cart {
    cookie_value(headers, CART_COOKIE)
        .and_then(|value| URL_SAFE_NO_PAD.decode(value).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Encode the cart into its cookie value.
#[must_use]
pub fn encode_cart(cart: &Cart) -> String {
    // Serializing Cart cannot fail: no maps with non-string keys, no floats.
    let json = serde_json::to_vec(cart).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Build the pair of `Set-Cookie` headers rewriting the cart state.
fn cart_cookies(
    cart: &Cart,
    secure: bool,
) -> AppendHeaders<[(header::HeaderName, HeaderValue); 2]> {
    let secure_attr = if secure { "; Secure" } else { "" };

    let cart_cookie = format!(
        "{CART_COOKIE}={}; Path=/; Max-Age={CART_MAX_AGE_SECS}; HttpOnly; SameSite=Lax{secure_attr}",
        encode_cart(cart)
    );
    // Deliberately not HttpOnly: the frontend badge reads it directly.
    let total_cookie = format!(
        "{TOTAL_COOKIE}={}; Path=/; Max-Age={TOTAL_MAX_AGE_SECS}; SameSite=Lax{secure_attr}",
        cart.total_huf()
    );

    AppendHeaders([
        (
            header::SET_COOKIE,
            HeaderValue::from_str(&cart_cookie).unwrap_or(HeaderValue::from_static("")),
        ),
        (
            header::SET_COOKIE,
            HeaderValue::from_str(&total_cookie).unwrap_or(HeaderValue::from_static("")),
        ),
    ])
}

// =============================================================================
// Catalog refresh
// =============================================================================

/// Re-resolve every line against the live catalog.
///
/// CMS errors propagate; a dead CMS must not silently empty carts.
async fn refresh_cart(state: &AppState, cart: Cart) -> Result<Cart> {
    let mut refreshed = Cart::default();

    for item in cart.items {
        let product = state.sanity().get_product(&item.slug).await?;
        if let Some(line) = refresh_line(item, product.as_deref()) {
            refreshed.items.push(line);
        }
    }

    Ok(refreshed)
}

/// Refresh one cart line against its catalog product.
///
/// Returns `None` when the product no longer resolves or its discount data
/// produces an invalid price; the cookie is never trusted for the price,
/// name, or image, only for the selection itself.
fn refresh_line(mut item: CartItem, product: Option<&ProductDoc>) -> Option<CartItem> {
    let Some(product) = product else {
        tracing::info!(slug = %item.slug, "Dropping cart line: product no longer resolves");
        return None;
    };
    let resolved = product.resolved_price();
    if resolved.invalid {
        tracing::warn!(slug = %item.slug, "Dropping cart line: invalid price data");
        return None;
    }

    item.price_huf = resolved.final_huf;
    item.name = product.name.clone();
    item.brand = product.brand.clone();
    item.image = product.first_image().map(String::from);
    item.upgrades = sanitize_upgrades(item.upgrades, &item.slug);
    Some(item)
}

/// Drop upgrades with a negative delta. The cookie and the add body are
/// client-held, and a negative delta would cheapen the order.
pub(crate) fn sanitize_upgrades(
    upgrades: Option<Vec<CartUpgrade>>,
    slug: &str,
) -> Option<Vec<CartUpgrade>> {
    let mut list = upgrades?;
    let before = list.len();
    list.retain(|u| u.delta_huf >= 0);
    if list.len() < before {
        tracing::warn!(slug = %slug, "Dropping upgrades with negative delta");
    }
    if list.is_empty() { None } else { Some(list) }
}

/// JSON body for the refreshed cart.
fn cart_body(cart: &Cart) -> Value {
    json!({
        "items": cart.items,
        "totalHuf": cart.total_huf(),
        "itemCount": cart.item_count(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart` - read, refresh, and rewrite the cart.
#[instrument(skip(state, headers))]
pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let cart = refresh_cart(&state, parse_cart(&headers)).await?;
    let cookies = cart_cookies(&cart, state.config().is_secure());
    Ok((cookies, Json(cart_body(&cart))))
}

/// Body for `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub slug: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub upgrades: Option<Vec<CartUpgrade>>,
}

const fn default_quantity() -> u32 {
    1
}

/// `POST /api/cart/add` - add a line, merging by slug.
///
/// The price snapshot comes from the catalog, never from the client.
#[instrument(skip(state, headers), fields(slug = %body.slug))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    if body.quantity == 0 {
        return Err(AppError::BadRequest("A mennyiség nem lehet nulla".to_string()));
    }

    let product = state
        .sanity()
        .get_product(&body.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(body.slug.clone()))?;

    let resolved = product.resolved_price();
    if resolved.invalid {
        return Err(AppError::BadRequest(
            "A termék jelenleg nem rendelhető".to_string(),
        ));
    }

    let mut cart = parse_cart(&headers);
    cart.add(CartItem {
        slug: product.slug.clone(),
        name: product.name.clone(),
        brand: product.brand.clone(),
        price_huf: resolved.final_huf,
        quantity: body.quantity,
        image: product.first_image().map(String::from),
        upgrades: body.upgrades,
    });

    let cart = refresh_cart(&state, cart).await?;
    let cookies = cart_cookies(&cart, state.config().is_secure());
    Ok((cookies, Json(cart_body(&cart))))
}

/// Body for `POST /api/cart/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub slug: String,
    pub quantity: u32,
}

/// `POST /api/cart/update` - set a line's quantity; zero removes it.
#[instrument(skip(state, headers), fields(slug = %body.slug, quantity = body.quantity))]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = parse_cart(&headers);
    cart.set_quantity(&body.slug, body.quantity);

    let cart = refresh_cart(&state, cart).await?;
    let cookies = cart_cookies(&cart, state.config().is_secure());
    Ok((cookies, Json(cart_body(&cart))))
}

/// Body for `POST /api/cart/remove`.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub slug: String,
}

/// `POST /api/cart/remove` - drop a line.
#[instrument(skip(state, headers), fields(slug = %body.slug))]
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RemoveRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = parse_cart(&headers);
    cart.remove(&body.slug);

    let cart = refresh_cart(&state, cart).await?;
    let cookies = cart_cookies(&cart, state.config().is_secure());
    Ok((cookies, Json(cart_body(&cart))))
}
