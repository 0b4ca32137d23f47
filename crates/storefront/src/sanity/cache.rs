//! Cache value types for the Sanity client.

use std::sync::Arc;

use super::types::ProductDoc;

/// Values stored in the moka cache.
///
/// Wrapped in `Arc` so cache hits are cheap clones.
#[derive(Clone)]
pub enum CacheValue {
    Product(Arc<ProductDoc>),
    Catalog(Arc<Vec<ProductDoc>>),
}
