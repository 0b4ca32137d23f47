//! Third-party service clients and cross-provider business operations.
//!
//! - [`barion`] - Barion Payment Gateway (Start + GetPaymentState)
//! - [`stripe`] - Stripe Checkout Sessions and webhook verification
//! - [`resend`] - Transactional email over the Resend API
//! - [`meta`] - Meta Conversions API relay (PII hashed server-side)
//! - [`settlement`] - The single "confirm payment and settle order" operation
//!   both providers converge on
//! - [`auth`] - Registration, login, and password reset

pub mod auth;
pub mod barion;
pub mod meta;
pub mod resend;
pub mod settlement;
pub mod stripe;
