//! Authentication error types.

use thiserror::Error;

use wellcomp_core::EmailError;

use crate::sanity::SanityError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination is wrong. Deliberately covers the
    /// user-not-found case too, so responses never disclose which part
    /// failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Reset token is unknown or expired.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    Hashing(String),

    /// CMS operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] SanityError),
}
