//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the CMS)
//!
//! # Catalog
//! GET  /api/products               - Product listing with resolved prices
//! GET  /api/products/{slug}        - Product detail
//!
//! # Cart (cookie-held, stateless on the server)
//! GET  /api/cart                   - Read + refresh the cart cookie
//! POST /api/cart/add               - Add a line (merges by slug)
//! POST /api/cart/update            - Set a line's quantity (0 removes)
//! POST /api/cart/remove            - Remove a line
//!
//! # Coupons
//! POST /api/coupon/validate        - Validate a code against a subtotal
//!
//! # Checkout & payments
//! POST /api/checkout/order         - Create an order (MEGRENDELVE)
//! POST /api/barion/start           - Open a Barion hosted payment
//! GET  /api/barion/state           - Poll Barion; settles on success
//! GET  /api/barion/order-status    - Cheap order-status poll (CMS only)
//! POST /api/stripe/checkout        - Create a Stripe Checkout Session
//! POST /api/stripe/webhook         - Stripe webhook (signature-verified)
//!
//! # Tracking
//! POST /api/meta/event             - Conversions API relay (hashed PII)
//!
//! # Utilities
//! GET  /api/zip                    - Postal code to city lookup
//! GET  /feed/arukereso.xml         - Árukereső product feed
//!
//! # Auth
//! POST /api/auth/register          - Register (anti-enumeration)
//! POST /api/auth/login             - Login (session cookie)
//! POST /api/auth/logout            - Logout
//! GET  /api/auth/me                - Current user
//! POST /api/auth/password-reset/request  - Send a reset link
//! POST /api/auth/password-reset/confirm  - Set a new password
//!
//! # Account (requires auth)
//! GET    /api/account/addresses            - List saved addresses
//! POST   /api/account/addresses            - Create an address
//! PUT    /api/account/addresses/{id}       - Update an address
//! DELETE /api/account/addresses/{id}       - Delete an address
//! POST   /api/account/addresses/{id}/default - Mark as default
//!
//! # Content
//! GET  /api/pages                  - Informational page index
//! GET  /api/pages/{slug}           - One page as rendered HTML
//! ```

pub mod account;
pub mod auth;
pub mod barion;
pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod feed;
pub mod health;
pub mod meta;
pub mod pages;
pub mod products;
pub mod stripe;
pub mod zip;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the auth routes router (mounted behind the strict rate limiter).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password-reset/request", post(auth::request_password_reset))
        .route("/password-reset/confirm", post(auth::confirm_password_reset))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/default", post(account::set_default_address))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/barion/start", post(barion::start))
        .route("/barion/state", get(barion::state))
        .route("/barion/order-status", get(barion::order_status))
        .route("/stripe/checkout", post(stripe::create_checkout))
        .route("/stripe/webhook", post(stripe::webhook))
}

/// Create all routes for the storefront.
///
/// Auth endpoints are wrapped in the strict rate limiter here; the relaxed
/// API limiter and the cross-cutting layers are applied in `main`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/api/products", get(products::index))
        .route("/api/products/{slug}", get(products::show))
        .nest("/api/cart", cart_routes())
        .route("/api/coupon/validate", post(coupon::validate))
        .route("/api/checkout/order", post(checkout::create_order))
        .nest("/api", payment_routes())
        .route("/api/meta/event", post(meta::relay_event))
        .route("/api/zip", get(zip::lookup))
        .route("/feed/arukereso.xml", get(feed::arukereso))
        .nest(
            "/api/auth",
            auth_routes().layer(crate::middleware::auth_rate_limiter()),
        )
        .nest("/api/account", account_routes())
        .route("/api/pages", get(pages::index))
        .route("/api/pages/{slug}", get(pages::show))
}
