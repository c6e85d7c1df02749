//! # Catalog Cache
//!
//! Process-wide TTL cache over the external catalog store. The mapping is
//! replaced wholesale on refresh, never partially updated, and a reader
//! always observes a consistent (mapping, timestamp) pair.

use crate::error::ShopResult;
use crate::product::{CatalogStore, ProductCatalog};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Maximum age of cached catalog data before a refresh is forced
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(30);

struct CacheEntry {
    catalog: Arc<ProductCatalog>,
    fetched_at: Instant,
}

/// TTL cache for the product catalog.
///
/// Empty at startup, populated on first access. A refresh failure
/// propagates to the caller and leaves the prior entry untouched; stale
/// data is never silently served on error.
pub struct CatalogCache {
    store: Arc<dyn CatalogStore>,
    freshness_window: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl CatalogCache {
    /// Create a cache with the default 30-second freshness window
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_freshness_window(store, FRESHNESS_WINDOW)
    }

    /// Create a cache with an explicit freshness window (for tests)
    pub fn with_freshness_window(store: Arc<dyn CatalogStore>, window: Duration) -> Self {
        Self {
            store,
            freshness_window: window,
            entry: RwLock::new(None),
        }
    }

    /// Return the current catalog, refreshing from the store when the
    /// cached mapping is absent, empty, or older than the freshness window.
    pub async fn fetch(&self) -> ShopResult<Arc<ProductCatalog>> {
        {
            let guard = self.entry.read().await;
            if let Some(entry) = guard.as_ref() {
                if entry.fetched_at.elapsed() < self.freshness_window && !entry.catalog.is_empty() {
                    return Ok(Arc::clone(&entry.catalog));
                }
            }
        }

        // No lock held across the store call: concurrent refreshes may both
        // query the store; last writer wins.
        let products = self.store.list_products().await?;
        let catalog = Arc::new(ProductCatalog::from_products(products));
        debug!("Refreshed catalog cache: {} products", catalog.len());

        let mut guard = self.entry.write().await;
        *guard = Some(CacheEntry {
            catalog: Arc::clone(&catalog),
            fetched_at: Instant::now(),
        });

        Ok(catalog)
    }
}
