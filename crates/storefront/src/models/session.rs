//! Session-stored models.

use serde::{Deserialize, Serialize};

use wellcomp_core::UserId;

/// Session storage keys.
pub mod session_keys {
    /// Key for the logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

/// The logged-in user, as stored in the session.
///
/// Holds only what handlers need on every request; anything else is fetched
/// from the CMS when required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
}
