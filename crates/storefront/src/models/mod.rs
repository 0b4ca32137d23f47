//! Request-scoped models shared across handlers.

pub mod session;

pub use session::{CurrentUser, session_keys};
