//! Cart state management.
//!
//! # Architecture
//!
//! - [`ops`] - Pure operations: given a cart and the catalog data they need,
//!   return a [`CartOutcome`]. Never touch storage or the network.
//! - [`store`] - [`CartStore`] owns the current cart, performs the catalog
//!   lookups, commits updated carts to storage, and turns refusals into
//!   notices.
//!
//! # Outcomes
//!
//! Business refusals (out of stock, product not in cart) and transport or
//! persistence failures are all values of [`CartOutcome`], never errors. A
//! refused operation leaves the cart exactly as it was.

pub mod ops;
pub mod store;

pub use store::CartStore;
pub use ops::{AddPlan, UpdatePlan};

use rocketshoes_core::{Cart, ProductId};
use serde::Deserialize;

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Request to set the amount of a product already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Target amount. Values below 1 are ignored.
    pub amount: i64,
}

/// The three mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

/// Result of a cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The cart changed; this is the new cart.
    Updated(Cart),
    /// Nothing to do (e.g. the requested amount equals the current one).
    Unchanged,
    /// The requested quantity exceeds the available stock.
    OutOfStock,
    /// The product is not in the cart.
    NotFound,
    /// A catalog lookup or the persistence step failed.
    Failed(String),
}

impl CartOutcome {
    /// Whether the cart was changed.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }

    /// Whether the operation was refused or failed.
    #[must_use]
    pub const fn is_refused(&self) -> bool {
        matches!(self, Self::OutOfStock | Self::NotFound | Self::Failed(_))
    }
}
