//! Sanity CMS client.
//!
//! # Architecture
//!
//! - GROQ queries over the HTTP query endpoint, mutations over the mutate
//!   endpoint (`/v{version}/data/{query|mutate}/{dataset}`)
//! - Sanity is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for product reads (5 minute TTL);
//!   mutations and order/user/coupon reads are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use wellcomp_storefront::sanity::SanityClient;
//!
//! let client = SanityClient::new(&config.sanity);
//! let product = client.get_product("probook-450").await?;
//! ```

mod cache;
pub mod queries;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};

use wellcomp_core::{OrderId, OrderStatus, UserId};

use crate::config::SanityConfig;
use cache::CacheValue;
use types::{AddressDoc, AddressFields, CouponDoc, NewOrder, OrderDoc, ProductDoc, UserDoc};

/// Cache TTL for product reads.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to Sanity.
#[derive(Debug, Error)]
pub enum SanityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A mutation response was missing an expected document ID.
    #[error("Mutation returned no document ID")]
    MissingDocumentId,
}

#[derive(serde::Deserialize)]
struct QueryEnvelope<T> {
    result: Option<T>,
}

#[derive(serde::Deserialize)]
struct MutateEnvelope {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(serde::Deserialize)]
struct MutateResult {
    id: Option<String>,
}

/// Client for the Sanity Content Lake API.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SanityClient {
    inner: Arc<SanityClientInner>,
}

struct SanityClientInner {
    client: reqwest::Client,
    query_url: String,
    mutate_url: String,
    token: String,
    cache: Cache<String, CacheValue>,
}

impl SanityClient {
    /// Create a new Sanity client.
    #[must_use]
    pub fn new(config: &SanityConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        let base = format!(
            "https://{}.api.sanity.io/v{}/data",
            config.project_id, config.api_version
        );

        Self {
            inner: Arc::new(SanityClientInner {
                client: reqwest::Client::new(),
                query_url: format!("{base}/query/{}", config.dataset),
                mutate_url: format!("{base}/mutate/{}", config.dataset),
                token: config.api_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    // =========================================================================
    // Raw query/mutate
    // =========================================================================

    /// Execute a GROQ query and deserialize the `result` field.
    ///
    /// Query parameters are passed as `$name` URL parameters with
    /// JSON-encoded values, per the Content Lake HTTP API.
    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, Value)],
    ) -> Result<Option<T>, SanityError> {
        let mut request = self
            .inner
            .client
            .get(&self.inner.query_url)
            .bearer_auth(&self.inner.token)
            .query(&[("query", groq)]);

        for (name, value) in params {
            request = request.query(&[(format!("${name}"), value.to_string())]);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Sanity query returned non-success status"
            );
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: QueryEnvelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.result)
    }

    /// Execute a list of mutations. Returns the affected document IDs.
    async fn mutate(&self, mutations: Value) -> Result<Vec<String>, SanityError> {
        let response = self
            .inner
            .client
            .post(&self.inner.mutate_url)
            .bearer_auth(&self.inner.token)
            .query(&[("returnIds", "true")])
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Sanity mutation returned non-success status"
            );
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: MutateEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.results.into_iter().filter_map(|r| r.id).collect())
    }

    /// Cheap connectivity probe for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or rejects the token.
    pub async fn ping(&self) -> Result<(), SanityError> {
        let _: Option<i64> = self.query("1", &[]).await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Get a product by its catalog slug. Cached for 5 minutes.
    ///
    /// Returns `Ok(None)` when no product resolves for the slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product(&self, slug: &str) -> Result<Option<Arc<ProductDoc>>, SanityError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(product));
        }

        let product: Option<ProductDoc> = self
            .query(&queries::product_by_slug(), &[("slug", json!(slug))])
            .await?;

        match product {
            Some(doc) => {
                let doc = Arc::new(doc);
                self.inner
                    .cache
                    .insert(cache_key, CacheValue::Product(Arc::clone(&doc)))
                    .await;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Get the full published catalog. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<ProductDoc>>, SanityError> {
        let cache_key = "catalog".to_string();

        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products: Vec<ProductDoc> = self
            .query(&queries::all_products(), &[])
            .await?
            .unwrap_or_default();

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Catalog(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Decrement a product's stock by `quantity`, floored at zero.
    ///
    /// Read-then-write per document; best-effort with no transaction across
    /// products. Double decrement is prevented upstream by the settlement
    /// status guard, not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be read or patched.
    #[instrument(skip(self), fields(slug = %slug, quantity = quantity))]
    pub async fn decrement_stock(&self, slug: &str, quantity: u32) -> Result<(), SanityError> {
        // Bypass the cache: stock must be read fresh.
        let product: Option<ProductDoc> = self
            .query(&queries::product_by_slug(), &[("slug", json!(slug))])
            .await?;

        let Some(product) = product else {
            tracing::warn!("Stock decrement skipped: product no longer resolves");
            return Ok(());
        };

        let new_stock = (product.stock - i64::from(quantity)).max(0);
        self.mutate(json!([
            { "patch": { "id": product.id, "set": { "stock": new_stock } } }
        ]))
        .await?;

        self.inner.cache.invalidate(&format!("product:{slug}")).await;
        Ok(())
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Look up an active coupon by code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_coupon(&self, code: &str) -> Result<Option<CouponDoc>, SanityError> {
        self.query(&queries::coupon_by_code(), &[("code", json!(code))])
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch an order by document ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Option<OrderDoc>, SanityError> {
        self.query(&queries::order_by_id(), &[("id", json!(order_id.as_str()))])
            .await
    }

    /// Fetch an order by the provider payment ID recorded on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_order_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<OrderDoc>, SanityError> {
        self.query(
            &queries::order_by_payment_id(),
            &[("paymentId", json!(payment_id))],
        )
        .await
    }

    /// Create a new order document with status `MEGRENDELVE`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails or no ID comes back.
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<OrderId, SanityError> {
        let mut doc = serde_json::to_value(order)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("_type".to_string(), json!("order"));
            map.insert("status".to_string(), json!(OrderStatus::Megrendelve.as_str()));
            map.insert("createdAt".to_string(), json!(Utc::now()));
        }

        let ids = self.mutate(json!([{ "create": doc }])).await?;
        ids.into_iter()
            .next()
            .map(OrderId::new)
            .ok_or(SanityError::MissingDocumentId)
    }

    /// Record the provider and payment ID on an order at payment start.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn set_order_payment(
        &self,
        order_id: &OrderId,
        provider: &str,
        payment_id: &str,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": { "id": order_id.as_str(), "set": {
                "paymentProvider": provider,
                "paymentId": payment_id
            } } }
        ]))
        .await?;
        Ok(())
    }

    /// Transition an order to `FIZETVE` and record the confirming payment ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_order_paid(
        &self,
        order_id: &OrderId,
        provider: &str,
        payment_id: &str,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": { "id": order_id.as_str(), "set": {
                "status": OrderStatus::Fizetve.as_str(),
                "paymentProvider": provider,
                "paymentId": payment_id,
                "paidAt": Utc::now()
            } } }
        ]))
        .await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Look up a user by canonical (lowercased) email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDoc>, SanityError> {
        self.query(&queries::user_by_email(), &[("email", json!(email))])
            .await
    }

    /// Look up a user holding an unexpired reset token hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn get_user_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserDoc>, SanityError> {
        self.query(
            &queries::user_by_reset_token(),
            &[("hash", json!(token_hash)), ("now", json!(Utc::now()))],
        )
        .await
    }

    /// Create a user document.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails or no ID comes back.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserId, SanityError> {
        let ids = self
            .mutate(json!([{ "create": {
                "_type": "user",
                "email": email,
                "name": name,
                "passwordHash": password_hash,
                "createdAt": Utc::now()
            } }]))
            .await?;
        ids.into_iter()
            .next()
            .map(UserId::new)
            .ok_or(SanityError::MissingDocumentId)
    }

    /// Store a password-reset token hash and its expiry on a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    pub async fn set_reset_token(
        &self,
        user_id: &UserId,
        token_hash: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": { "id": user_id.as_str(), "set": {
                "resetTokenHash": token_hash,
                "resetTokenExpiresAt": expires_at
            } } }
        ]))
        .await?;
        Ok(())
    }

    /// Replace the password hash and clear any outstanding reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    pub async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": {
                "id": user_id.as_str(),
                "set": { "passwordHash": password_hash },
                "unset": ["resetTokenHash", "resetTokenExpiresAt"]
            } }
        ]))
        .await?;
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List a user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn list_addresses(&self, user_id: &UserId) -> Result<Vec<AddressDoc>, SanityError> {
        Ok(self
            .query(
                &queries::addresses_by_user(),
                &[("userId", json!(user_id.as_str()))],
            )
            .await?
            .unwrap_or_default())
    }

    /// Fetch one address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn get_address(
        &self,
        user_id: &UserId,
        address_id: &str,
    ) -> Result<Option<AddressDoc>, SanityError> {
        self.query(
            &queries::address_by_id(),
            &[("id", json!(address_id)), ("userId", json!(user_id.as_str()))],
        )
        .await
    }

    /// Create an address document referencing the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails or no ID comes back.
    pub async fn create_address(
        &self,
        user_id: &UserId,
        fields: &AddressFields,
    ) -> Result<String, SanityError> {
        let mut doc = serde_json::to_value(fields)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("_type".to_string(), json!("address"));
            map.insert(
                "user".to_string(),
                json!({ "_type": "reference", "_ref": user_id.as_str() }),
            );
            map.insert("isDefault".to_string(), json!(false));
        }
        let ids = self.mutate(json!([{ "create": doc }])).await?;
        ids.into_iter().next().ok_or(SanityError::MissingDocumentId)
    }

    /// Update an address document's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    pub async fn update_address(
        &self,
        address_id: &str,
        fields: &AddressFields,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": { "id": address_id, "set": serde_json::to_value(fields)? } }
        ]))
        .await?;
        Ok(())
    }

    /// Delete an address document.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails.
    pub async fn delete_address(&self, address_id: &str) -> Result<(), SanityError> {
        self.mutate(json!([{ "delete": { "id": address_id } }]))
            .await?;
        Ok(())
    }

    /// Set `is_default` on one address document.
    ///
    /// The caller clears the flag on the user's other addresses with separate
    /// calls; there is no atomicity across the documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch fails.
    pub async fn set_address_default(
        &self,
        address_id: &str,
        is_default: bool,
    ) -> Result<(), SanityError> {
        self.mutate(json!([
            { "patch": { "id": address_id, "set": { "isDefault": is_default } } }
        ]))
        .await?;
        Ok(())
    }
}
