//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::{Catalog, CatalogClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is generic over the catalog
/// so tests can serve the API against an in-memory catalog.
pub struct AppState<C> {
    inner: Arc<AppStateInner<C>>,
}

struct AppStateInner<C> {
    cart: CartStore<C>,
}

/// State of the production server.
pub type StorefrontState = AppState<CatalogClient>;

impl<C: Catalog> AppState<C> {
    /// Create a new application state around an opened cart store.
    #[must_use]
    pub fn new(cart: CartStore<C>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cart }),
        }
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore<C> {
        &self.inner.cart
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
