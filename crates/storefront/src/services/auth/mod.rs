//! Authentication service.
//!
//! Password registration and login, plus the two-step password reset flow.
//! User documents live in the CMS; password hashes are argon2, reset tokens
//! are random 32-byte values stored only as SHA-256 hashes with a one-hour
//! expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{TimeDelta, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use wellcomp_core::{Email, UserId};

use crate::sanity::SanityClient;
use crate::sanity::types::UserDoc;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    sanity: SanityClient,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(sanity: SanityClient) -> Self {
        Self { sanity }
    }

    /// Register a new user with email and password.
    ///
    /// Returns `Ok(None)` when the email is already registered - the caller
    /// responds with the same generic success either way, so the endpoint
    /// cannot be used to enumerate accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for
    /// bad input, `AuthError::Repository` for CMS failures.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Option<UserId>, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        if self.sanity.get_user_by_email(email.as_str()).await?.is_some() {
            tracing::info!("Registration attempt for existing email");
            return Ok(None);
        }

        let user_id = self
            .sanity
            .create_user(email.as_str(), name, &password_hash)
            .await?;
        Ok(Some(user_id))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserDoc, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .sanity
            .get_user_by_email(email.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    /// Issue a password reset token for the account behind `email`.
    ///
    /// Returns the raw token to embed in the emailed link, or `None` when no
    /// such account exists - the caller responds identically in both cases.
    /// Only the SHA-256 hash of the token is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` for CMS failures.
    pub async fn issue_reset_token(&self, email: &str) -> Result<Option<String>, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.sanity.get_user_by_email(email.as_str()).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(None);
        };

        let token = generate_token();
        let expires_at = Utc::now() + TimeDelta::hours(RESET_TOKEN_TTL_HOURS);
        self.sanity
            .set_reset_token(&UserId::new(&user.id), &hash_token(&token), expires_at)
            .await?;

        Ok(Some(token))
    }

    /// Complete a password reset: validate the token, set the new password,
    /// clear the token fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` if the token is unknown or
    /// expired, `AuthError::WeakPassword` for a bad new password.
    pub async fn confirm_reset(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let user = self
            .sanity
            .get_user_by_reset_token(&hash_token(token))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = hash_password(new_password)?;
        self.sanity
            .update_password(&UserId::new(&user.id), &password_hash)
            .await?;

        tracing::info!("Password reset completed");
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Validate password strength requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "A jelszónak legalább {MIN_PASSWORD_LENGTH} karakter hosszúnak kell lennie"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a random 32-byte token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hash of a token, hex-encoded, as stored in the CMS.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("rövid"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("hosszú és jó jelszó").is_ok());
    }

    #[test]
    fn tokens_are_unique_and_hashed_deterministically() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), hash_token(&b));
        // The stored form never equals the raw token.
        assert_ne!(hash_token(&a), a);
    }
}
