//! The persisted cart store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rocketshoes_core::{Cart, CartLineItem, ProductId};
use tracing::{debug, instrument, warn};

use super::ops::{self, AddPlan, UpdatePlan};
use super::{CartOperation, CartOutcome, UpdateProductAmount};
use crate::catalog::Catalog;
use crate::notify::{Notice, Notifier};
use crate::storage::{CartStorage, StorageError};

/// Owns the current cart and mirrors it to storage.
///
/// Reads return snapshots. Mutations compute a new cart from the current one,
/// write it to storage, and only then replace the in-memory cart, so a failed
/// write leaves both sides as they were.
///
/// Catalog lookups happen without holding the cart lock; the operation is
/// then evaluated against the cart as it is at commit time. Concurrent
/// operations therefore never overwrite each other's changes.
///
/// A commit holds the cart lock while the storage write runs. The async
/// operations run their commit on the blocking pool; [`Self::remove_product`]
/// writes on the calling thread, so async callers should wrap it in
/// `spawn_blocking`.
pub struct CartStore<C> {
    catalog: C,
    notifier: Arc<dyn Notifier>,
    slot: Arc<CartSlot>,
}

/// The in-memory cart together with the storage slot it is mirrored to.
struct CartSlot {
    storage: Arc<dyn CartStorage>,
    key: String,
    cart: Mutex<Cart>,
}

impl<C: Catalog> CartStore<C> {
    /// Open the store, restoring the cart persisted under `key`.
    ///
    /// A missing, unreadable, or invalid stored cart yields an empty cart.
    pub fn open(
        catalog: C,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let cart = load(storage.as_ref(), &key);

        Self {
            catalog,
            notifier,
            slot: Arc::new(CartSlot {
                storage,
                key,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.slot.lock().clone()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.slot.lock().item_count()
    }

    /// Snapshot of one line item.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<CartLineItem> {
        self.slot.lock().find(id).cloned()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.slot.key
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Add one unit of a product.
    ///
    /// Checks the stock first; a product not yet in the cart is fetched from
    /// the catalog and appended with amount 1.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> CartOutcome {
        let outcome = self.try_add(id).await;
        self.report(CartOperation::Add, outcome)
    }

    async fn try_add(&self, id: ProductId) -> CartOutcome {
        let stock = match self.catalog.stock(id).await {
            Ok(stock) => stock,
            Err(e) => {
                warn!(error = %e, "Stock lookup failed");
                return CartOutcome::Failed(e.to_string());
            }
        };

        let product = match ops::plan_add(&self.cart(), id, &stock) {
            AddPlan::OutOfStock => return CartOutcome::OutOfStock,
            AddPlan::Increment => None,
            AddPlan::Append => match self.catalog.product(id).await {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Product lookup failed");
                    return CartOutcome::Failed(e.to_string());
                }
            },
        };

        self.commit_blocking(move |cart| ops::add_product(cart, id, &stock, product.as_ref()))
            .await
    }

    /// Remove a product from the cart.
    ///
    /// Writes to storage on the calling thread.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_product(&self, id: ProductId) -> CartOutcome {
        let outcome = self.slot.commit(|cart| ops::remove_product(cart, id));
        self.report(CartOperation::Remove, outcome)
    }

    /// Move a product's amount one unit towards the requested amount.
    ///
    /// Requests below 1 are ignored without a notice. Increases are checked
    /// against the stock for the full requested amount.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) -> CartOutcome {
        let outcome = self.try_update(update).await;
        self.report(CartOperation::Update, outcome)
    }

    async fn try_update(&self, update: UpdateProductAmount) -> CartOutcome {
        let UpdateProductAmount { product_id, amount } = update;

        let stock = match ops::plan_update(&self.cart(), product_id, amount) {
            UpdatePlan::Ignore | UpdatePlan::Unchanged => return CartOutcome::Unchanged,
            UpdatePlan::NotFound => return CartOutcome::NotFound,
            UpdatePlan::Decrement => None,
            UpdatePlan::Increment => match self.catalog.stock(product_id).await {
                Ok(stock) => Some(stock),
                Err(e) => {
                    warn!(error = %e, "Stock lookup failed");
                    return CartOutcome::Failed(e.to_string());
                }
            },
        };

        self.commit_blocking(move |cart| {
            ops::update_product_amount(cart, product_id, amount, stock.as_ref())
        })
        .await
    }

    /// Commit on the blocking pool so storage I/O stays off the async workers.
    async fn commit_blocking(
        &self,
        op: impl FnOnce(&Cart) -> CartOutcome + Send + 'static,
    ) -> CartOutcome {
        let slot = Arc::clone(&self.slot);
        match tokio::task::spawn_blocking(move || slot.commit(op)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, key = %self.slot.key, "Cart commit task failed");
                CartOutcome::Failed(e.to_string())
            }
        }
    }

    fn report(&self, operation: CartOperation, outcome: CartOutcome) -> CartOutcome {
        if let Some(notice) = Notice::for_outcome(operation, &outcome) {
            self.notifier.notify(notice);
        }
        outcome
    }
}

impl CartSlot {
    /// Run `op` against the current cart and commit an updated cart.
    fn commit(&self, op: impl FnOnce(&Cart) -> CartOutcome) -> CartOutcome {
        let mut cart = self.lock();
        match op(&cart) {
            CartOutcome::Updated(next) => match self.persist(&next) {
                Ok(()) => {
                    debug!(items = next.len(), count = next.item_count(), "Cart committed");
                    *cart = next.clone();
                    CartOutcome::Updated(next)
                }
                Err(e) => {
                    tracing::error!(error = %e, key = %self.key, "Failed to persist cart");
                    CartOutcome::Failed(e.to_string())
                }
            },
            other => other,
        }
    }

    fn persist(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.storage.set(&self.key, &json)
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read the persisted cart, falling back to an empty one.
fn load(storage: &dyn CartStorage, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, key, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    let parsed = serde_json::from_str::<Cart>(&raw)
        .map_err(|e| e.to_string())
        .and_then(|cart| cart.validate().map(|()| cart).map_err(|e| e.to_string()));

    match parsed {
        Ok(cart) => {
            debug!(items = cart.len(), key, "Restored stored cart");
            cart
        }
        Err(e) => {
            warn!(error = %e, key, "Discarding unreadable stored cart");
            Cart::new()
        }
    }
}
