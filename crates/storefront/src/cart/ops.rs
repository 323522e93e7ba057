//! Pure cart operations.
//!
//! Every function takes the current cart by reference and returns a
//! [`CartOutcome`]; the input cart is never modified. Catalog data an
//! operation depends on is passed in, already fetched. The `plan_*` functions
//! tell the caller which lookups an operation needs before it can run.

use rocketshoes_core::{Cart, CartLineItem, Product, ProductId, Stock};

use super::CartOutcome;

/// What adding one unit of a product will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPlan {
    /// One more unit would exceed the stock.
    OutOfStock,
    /// The product is in the cart; its amount goes up by one.
    Increment,
    /// The product is new; its details must be fetched and appended.
    Append,
}

/// What an amount update will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Requested amount below 1; silently ignored.
    Ignore,
    NotFound,
    Unchanged,
    Decrement,
    /// Needs a stock lookup before it can run.
    Increment,
}

/// Decide what adding `id` does, given its stock.
#[must_use]
pub fn plan_add(cart: &Cart, id: ProductId, stock: &Stock) -> AddPlan {
    let current = cart.amount_of(id);
    match current.checked_add(1) {
        Some(requested) if stock.covers(requested) => {
            if current == 0 {
                AddPlan::Append
            } else {
                AddPlan::Increment
            }
        }
        _ => AddPlan::OutOfStock,
    }
}

/// Add one unit of `id`.
///
/// `product` is only consulted when the product is not in the cart yet; if it
/// is needed and missing the outcome is [`CartOutcome::Failed`].
#[must_use]
pub fn add_product(
    cart: &Cart,
    id: ProductId,
    stock: &Stock,
    product: Option<&Product>,
) -> CartOutcome {
    match plan_add(cart, id, stock) {
        AddPlan::OutOfStock => CartOutcome::OutOfStock,
        AddPlan::Increment => {
            let mut next = cart.clone();
            let amount = cart.amount_of(id) + 1;
            match next.set_amount(id, amount) {
                Ok(()) => CartOutcome::Updated(next),
                Err(e) => CartOutcome::Failed(e.to_string()),
            }
        }
        AddPlan::Append => {
            let Some(product) = product else {
                return CartOutcome::Failed(format!("details for product {id} were not loaded"));
            };
            let mut next = cart.clone();
            match next.push(CartLineItem::new(product.clone())) {
                Ok(()) => CartOutcome::Updated(next),
                Err(e) => CartOutcome::Failed(e.to_string()),
            }
        }
    }
}

/// Remove the line item for `id`.
#[must_use]
pub fn remove_product(cart: &Cart, id: ProductId) -> CartOutcome {
    let mut next = cart.clone();
    match next.remove(id) {
        Some(_) => CartOutcome::Updated(next),
        None => CartOutcome::NotFound,
    }
}

/// Decide what requesting `amount` units of `id` does.
#[must_use]
pub fn plan_update(cart: &Cart, id: ProductId, amount: i64) -> UpdatePlan {
    if amount < 1 {
        return UpdatePlan::Ignore;
    }
    let Some(item) = cart.find(id) else {
        return UpdatePlan::NotFound;
    };
    match amount.cmp(&i64::from(item.amount)) {
        std::cmp::Ordering::Greater => UpdatePlan::Increment,
        std::cmp::Ordering::Less => UpdatePlan::Decrement,
        std::cmp::Ordering::Equal => UpdatePlan::Unchanged,
    }
}

/// Move the amount of `id` one step towards `amount`.
///
/// The amount changes by exactly one per call whatever the gap to the target:
/// current 2, requested 5 yields 3. An increase is admitted only if the stock
/// covers the full requested amount. `stock` is required for increases.
#[must_use]
pub fn update_product_amount(
    cart: &Cart,
    id: ProductId,
    amount: i64,
    stock: Option<&Stock>,
) -> CartOutcome {
    let current = cart.amount_of(id);
    let next_amount = match plan_update(cart, id, amount) {
        UpdatePlan::Ignore | UpdatePlan::Unchanged => return CartOutcome::Unchanged,
        UpdatePlan::NotFound => return CartOutcome::NotFound,
        UpdatePlan::Decrement => current - 1,
        UpdatePlan::Increment => {
            let Some(stock) = stock else {
                return CartOutcome::Failed(format!("stock for product {id} was not loaded"));
            };
            let requested = u32::try_from(amount).unwrap_or(u32::MAX);
            if !stock.covers(requested) {
                return CartOutcome::OutOfStock;
            }
            current + 1
        }
    };

    let mut next = cart.clone();
    match next.set_amount(id, next_amount) {
        Ok(()) => CartOutcome::Updated(next),
        Err(e) => CartOutcome::Failed(e.to_string()),
    }
}
