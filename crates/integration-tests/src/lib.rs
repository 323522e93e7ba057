//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store behavior against stub catalog and storage
//! - `cart_api` - JSON cart API through the router
//! - `catalog_client` - HTTP catalog client against a local fake catalog
//!
//! This library holds the shared fixtures.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rocketshoes_core::{Price, Product, ProductId, Stock};
use rocketshoes_storefront::cart::{CartStore, DEFAULT_CART_KEY};
use rocketshoes_storefront::catalog::{Catalog, CatalogError};
use rocketshoes_storefront::notify::RecordingNotifier;
use rocketshoes_storefront::storage::{CartStorage, MemoryStorage, StorageError};

/// A product fixture with a predictable title and price.
#[must_use]
pub fn sneaker(id: i32) -> Product {
    Product::new(
        ProductId::new(id),
        format!("Tênis {id}"),
        Price::from_cents(10_000 + i64::from(id) * 1_000),
        format!("https://cdn.rocketshoes.test/{id}.jpg"),
    )
}

// =============================================================================
// StubCatalog
// =============================================================================

/// In-memory catalog with adjustable stock and an offline switch.
///
/// Lookups answer immediately unless [`StubCatalog::yielding`] is set, in
/// which case each lookup suspends once so concurrent cart operations
/// interleave like they would against a remote catalog.
#[derive(Default)]
pub struct StubCatalog {
    stock: Mutex<HashMap<ProductId, u32>>,
    offline: AtomicBool,
    yielding: bool,
    stock_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

impl StubCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sneaker(id)` with `amount` units in stock.
    #[must_use]
    pub fn with_stock(self, id: i32, amount: u32) -> Self {
        self.set_stock(id, amount);
        self
    }

    /// Suspend once inside every lookup.
    #[must_use]
    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        self.stock
            .lock()
            .unwrap()
            .insert(ProductId::new(id), amount);
    }

    /// Make every lookup fail from now on.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self) -> Result<(), CatalogError> {
        if self.yielding {
            tokio::task::yield_now().await;
        }
        self.check_online()
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Api {
                status: 503,
                message: "catalog offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Catalog for StubCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup().await?;
        let amount = self
            .stock
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(format!("stock/{id}")))?;
        Ok(Stock { id, amount })
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.lookup().await?;
        if self.stock.lock().unwrap().contains_key(&id) {
            Ok(sneaker(id.as_i32()))
        } else {
            Err(CatalogError::NotFound(format!("products/{id}")))
        }
    }
}

// =============================================================================
// CountingStorage
// =============================================================================

/// Memory storage that counts writes and can refuse them.
#[derive(Debug, Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
    refuse_writes: AtomicBool,
}

impl CountingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn refuse_writes(&self) {
        self.refuse_writes.store(true, Ordering::SeqCst);
    }

    /// Raw value of the default cart slot.
    pub fn raw_cart(&self) -> Option<String> {
        self.inner.get(DEFAULT_CART_KEY).unwrap()
    }
}

impl CartStorage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.refuse_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A store wired to stub collaborators, with handles to inspect them.
pub struct Harness {
    pub store: CartStore<StubCatalog>,
    pub storage: Arc<CountingStorage>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    /// Open a store over fresh storage.
    #[must_use]
    pub fn new(catalog: StubCatalog) -> Self {
        Self::with_storage(catalog, Arc::new(CountingStorage::new()))
    }

    /// Open a store over existing storage (simulates a reload).
    #[must_use]
    pub fn with_storage(catalog: StubCatalog, storage: Arc<CountingStorage>) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let store = CartStore::open(
            catalog,
            storage.clone(),
            notifier.clone(),
            DEFAULT_CART_KEY,
        );
        Self {
            store,
            storage,
            notifier,
        }
    }
}
