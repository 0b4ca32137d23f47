//! Integration tests for the WELLCOMP storefront.
//!
//! # Running Tests
//!
//! Most tests in `tests/` exercise a running storefront over HTTP and are
//! `#[ignore]`d by default:
//!
//! ```bash
//! # Start the storefront against a test Sanity dataset
//! cargo run -p wellcomp-storefront
//!
//! # Run the HTTP tests
//! cargo test -p wellcomp-integration-tests -- --ignored
//! ```
//!
//! The non-ignored tests run in-process against the library crates and need
//! no server.
//!
//! # Test Categories
//!
//! - `storefront_catalog` - product listing, ZIP lookup, pages, feed
//! - `storefront_cart` - cookie cart flow
//! - `storefront_auth` - registration, login, password reset
//! - `storefront_checkout` - coupon validation and order creation
//! - `smoke` - in-process checks of bundled data and pricing

use reqwest::Client;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// An HTTP client with a cookie store, so the cart and session cookies
/// persist across requests the way a browser would carry them.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
