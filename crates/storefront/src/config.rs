//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WELLCOMP_BASE_URL` - Public URL for the storefront API
//! - `WELLCOMP_FRONTEND_URL` - Origin of the React frontend (CORS)
//! - `WELLCOMP_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `SANITY_PROJECT_ID` - Sanity project identifier
//! - `SANITY_DATASET` - Sanity dataset name (e.g., production)
//! - `SANITY_API_TOKEN` - Sanity API token with write access
//! - `BARION_POS_KEY` - Barion POS key
//! - `BARION_PAYEE` - Barion payee email address
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//! - `RESEND_API_KEY` - Resend email API key
//! - `RESEND_FROM` - Sender address for transactional email
//! - `ORDER_NOTIFICATION_EMAIL` - Internal copy of order confirmations
//!
//! ## Optional
//! - `WELLCOMP_HOST` - Bind address (default: 127.0.0.1)
//! - `WELLCOMP_PORT` - Listen port (default: 3000)
//! - `SANITY_API_VERSION` - API version date (default: 2024-01-01)
//! - `BARION_BASE_URL` - Barion API base (default: test environment)
//! - `META_PIXEL_ID` - Meta pixel ID for the Conversions API relay
//! - `META_CAPI_TOKEN` - Meta Conversions API access token
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct WellcompConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront API
    pub base_url: String,
    /// Origin of the React frontend, used for CORS and redirect URLs
    pub frontend_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Sanity CMS configuration
    pub sanity: SanityConfig,
    /// Barion payment configuration
    pub barion: BarionConfig,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Resend transactional email configuration
    pub resend: ResendConfig,
    /// Meta Conversions API configuration (relay disabled when absent)
    pub meta: Option<MetaConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Sanity CMS configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct SanityConfig {
    /// Project identifier (subdomain of api.sanity.io)
    pub project_id: String,
    /// Dataset name (e.g., production)
    pub dataset: String,
    /// API version date
    pub api_version: String,
    /// API token with read/write access (server-side only)
    pub api_token: SecretString,
}

impl std::fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Barion payment provider configuration.
#[derive(Clone)]
pub struct BarionConfig {
    /// API base URL (test or production environment)
    pub base_url: String,
    /// POS key identifying the shop
    pub pos_key: SecretString,
    /// Payee email address receiving the payments
    pub payee: String,
}

impl std::fmt::Debug for BarionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarionConfig")
            .field("base_url", &self.base_url)
            .field("pos_key", &"[REDACTED]")
            .field("payee", &self.payee)
            .finish()
    }
}

/// Stripe payment provider configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key
    pub secret_key: SecretString,
    /// Webhook signing secret (whsec_...)
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// Resend transactional email configuration.
#[derive(Clone)]
pub struct ResendConfig {
    /// API key
    pub api_key: SecretString,
    /// Sender address (e.g., "WELLCOMP <rendeles@wellcomp.hu>")
    pub from: String,
    /// Internal address receiving a copy of each order confirmation
    pub internal_address: String,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("from", &self.from)
            .field("internal_address", &self.internal_address)
            .finish()
    }
}

/// Meta Conversions API configuration.
#[derive(Clone)]
pub struct MetaConfig {
    /// Pixel ID events are forwarded to
    pub pixel_id: String,
    /// Conversions API access token
    pub access_token: SecretString,
}

impl std::fmt::Debug for MetaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaConfig")
            .field("pixel_id", &self.pixel_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl WellcompConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("WELLCOMP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WELLCOMP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("WELLCOMP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WELLCOMP_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("WELLCOMP_BASE_URL")?;
        let frontend_url = get_required_env("WELLCOMP_FRONTEND_URL")?;
        let session_secret = get_validated_secret("WELLCOMP_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "WELLCOMP_SESSION_SECRET")?;

        let sanity = SanityConfig::from_env()?;
        let barion = BarionConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;
        let resend = ResendConfig::from_env()?;
        let meta = MetaConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            frontend_url,
            session_secret,
            sanity,
            barion,
            stripe,
            resend,
            meta,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls Secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SanityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: get_required_env("SANITY_PROJECT_ID")?,
            dataset: get_env_or_default("SANITY_DATASET", "production"),
            api_version: get_env_or_default("SANITY_API_VERSION", "2024-01-01"),
            api_token: get_validated_secret("SANITY_API_TOKEN")?,
        })
    }
}

impl BarionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_env_or_default("BARION_BASE_URL", "https://api.test.barion.com"),
            pos_key: get_validated_secret("BARION_POS_KEY")?,
            payee: get_required_env("BARION_PAYEE")?,
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
        })
    }
}

impl ResendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("RESEND_API_KEY")?,
            from: get_required_env("RESEND_FROM")?,
            internal_address: get_required_env("ORDER_NOTIFICATION_EMAIL")?,
        })
    }
}

impl MetaConfig {
    /// The Meta relay is optional; both variables must be present to enable it.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("META_PIXEL_ID"),
            get_optional_env("META_CAPI_TOKEN"),
        ) {
            (Some(pixel_id), Some(token)) => {
                validate_secret_strength(&token, "META_CAPI_TOKEN")?;
                Ok(Some(Self {
                    pixel_id,
                    access_token: SecretString::from(token),
                }))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("META_CAPI_TOKEN".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("META_PIXEL_ID".to_string())),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A config with plausible values, for tests that never touch the network.
    #[must_use]
    pub(crate) fn test_config() -> WellcompConfig {
        WellcompConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            sanity: SanityConfig {
                project_id: "w3llc0mp".to_string(),
                dataset: "production".to_string(),
                api_version: "2024-01-01".to_string(),
                api_token: SecretString::from("sk-test-token"),
            },
            barion: BarionConfig {
                base_url: "https://api.test.barion.com".to_string(),
                pos_key: SecretString::from("pos-key"),
                payee: "penztar@wellcomp.hu".to_string(),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_123"),
                webhook_secret: SecretString::from("whsec_test123"),
            },
            resend: ResendConfig {
                api_key: SecretString::from("re_test_123"),
                from: "WELLCOMP <rendeles@wellcomp.hu>".to_string(),
                internal_address: "bolt@wellcomp.hu".to_string(),
            },
            meta: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("w3llc0mp"));
        assert!(debug_output.contains("penztar@wellcomp.hu"));

        // Secret fields should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_test_123"));
        assert!(!debug_output.contains("whsec_test123"));
        assert!(!debug_output.contains("sk-test-token"));
    }
}
