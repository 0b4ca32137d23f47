//! WELLCOMP Core - Shared domain library.
//!
//! This crate holds the domain model shared by the storefront server and its
//! tests:
//!
//! - [`pricing`] - Best-discount-wins price resolution
//! - [`cart`] - Cart line items, totals, and mutation rules
//! - [`coupon`] - Coupon redeemability and clamped discount math
//! - [`order`] - Order status machine and stock deduction rules
//! - [`types`] - Newtype wrappers for document IDs and email addresses
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no HTTP
//! clients, no CMS access. Everything here is deterministic and unit-testable
//! without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod coupon;
pub mod order;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartItem, CartUpgrade};
pub use coupon::{Coupon, CouponKind};
pub use order::{OrderLine, OrderStatus, stock_deductions};
pub use pricing::{Discount, DiscountKind, ResolvedPrice, resolve_price};
pub use types::*;
