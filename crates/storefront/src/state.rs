//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WellcompConfig;
use crate::content::ContentStore;
use crate::sanity::SanityClient;
use crate::services::auth::AuthService;
use crate::services::barion::BarionClient;
use crate::services::meta::MetaClient;
use crate::services::resend::{ResendClient, ResendError};
use crate::services::settlement::SettlementService;
use crate::services::stripe::StripeClient;
use crate::zip::ZipCodeTable;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the CMS client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WellcompConfig,
    sanity: SanityClient,
    barion: BarionClient,
    stripe: StripeClient,
    resend: ResendClient,
    meta: Option<MetaClient>,
    auth: AuthService,
    settlement: SettlementService,
    content: ContentStore,
    zip_codes: ZipCodeTable,
}

impl AppState {
    /// Create a new application state, wiring every client from config.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `content` - Pre-loaded markdown page store
    ///
    /// # Errors
    ///
    /// Returns an error if the email client cannot be constructed.
    pub fn new(config: WellcompConfig, content: ContentStore) -> Result<Self, ResendError> {
        let sanity = SanityClient::new(&config.sanity);
        let barion = BarionClient::new(&config.barion);
        let stripe = StripeClient::new(&config.stripe);
        let resend = ResendClient::new(&config.resend)?;
        let meta = config.meta.as_ref().map(MetaClient::new);
        let auth = AuthService::new(sanity.clone());
        let settlement = SettlementService::new(sanity.clone(), resend.clone());
        let zip_codes = ZipCodeTable::bundled();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                sanity,
                barion,
                stripe,
                resend,
                meta,
                auth,
                settlement,
                content,
                zip_codes,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &WellcompConfig {
        &self.inner.config
    }

    /// Get a reference to the Sanity CMS client.
    #[must_use]
    pub fn sanity(&self) -> &SanityClient {
        &self.inner.sanity
    }

    /// Get a reference to the Barion payment client.
    #[must_use]
    pub fn barion(&self) -> &BarionClient {
        &self.inner.barion
    }

    /// Get a reference to the Stripe payment client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the transactional email client.
    #[must_use]
    pub fn resend(&self) -> &ResendClient {
        &self.inner.resend
    }

    /// Get the Conversions API client, if configured.
    #[must_use]
    pub fn meta(&self) -> Option<&MetaClient> {
        self.inner.meta.as_ref()
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the payment settlement service.
    #[must_use]
    pub fn settlement(&self) -> &SettlementService {
        &self.inner.settlement
    }

    /// Get a reference to the markdown page store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get a reference to the ZIP code lookup table.
    #[must_use]
    pub fn zip_codes(&self) -> &ZipCodeTable {
        &self.inner.zip_codes
    }
}
