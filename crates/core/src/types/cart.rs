//! The cart collection and its line items.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s. Order is the order in
//! which products were first added. The collection enforces two invariants on
//! every mutation and on [`Cart::from_items`]:
//!
//! - at most one line item per product ID
//! - every line item has an amount of at least 1
//!
//! Line items serialize flat, with the product fields next to `amount`:
//!
//! ```json
//! [{"id": 1, "title": "Sneaker", "price": "179.90", "image": "...", "amount": 2}]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Errors raised when a cart invariant would be violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product {0} is already in the cart")]
    DuplicateItem(ProductId),
    #[error("product {0} would have an amount of zero")]
    ZeroAmount(ProductId),
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),
}

/// One product in the cart with its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartLineItem {
    /// Create a line item for a product that was not in the cart yet.
    ///
    /// A catalog field named `amount` is dropped so it cannot shadow the
    /// line item's own amount.
    #[must_use]
    pub fn new(mut product: Product) -> Self {
        product.extra.remove("amount");
        Self { product, amount: 1 }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.amount
    }
}

/// Ordered cart collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if two items share a product ID or an item has an
    /// amount of zero.
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, CartError> {
        let cart = Self { items };
        cart.validate()?;
        Ok(cart)
    }

    /// Check the collection invariants.
    ///
    /// Deserialization does not run this; callers loading untrusted data
    /// should.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), CartError> {
        for (index, item) in self.items.iter().enumerate() {
            if item.amount == 0 {
                return Err(CartError::ZeroAmount(item.id()));
            }
            if self.items.iter().skip(index + 1).any(|other| other.id() == item.id()) {
                return Err(CartError::DuplicateItem(item.id()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Amount of a product currently in the cart, or 0 when absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.find(id).map_or(0, |item| item.amount)
    }

    /// Total number of units across all line items (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::new(self.items.iter().map(|item| item.line_total().amount()).sum())
    }

    /// Append a new line item at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the product is already present or the amount is
    /// zero. The cart is left untouched.
    pub fn push(&mut self, item: CartLineItem) -> Result<(), CartError> {
        if item.amount == 0 {
            return Err(CartError::ZeroAmount(item.id()));
        }
        if self.find(item.id()).is_some() {
            return Err(CartError::DuplicateItem(item.id()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Set the amount of an existing line item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if the product is absent and
    /// `CartError::ZeroAmount` if `amount` is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CartError> {
        if amount == 0 {
            return Err(CartError::ZeroAmount(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CartError::NotFound(id))?;
        item.amount = amount;
        Ok(())
    }

    /// Remove a line item, keeping the relative order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Option<CartLineItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> CartLineItem {
        CartLineItem {
            product: Product::new(
                ProductId::new(id),
                format!("Sneaker {id}"),
                Price::from_cents(10_000 + i64::from(id)),
                format!("https://cdn.example.com/{id}.jpg"),
            ),
            amount,
        }
    }

    #[test]
    fn test_line_item_serializes_flat() {
        let json = serde_json::to_value(item(1, 2)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Sneaker 1");
        assert_eq!(json["amount"], 2);
        assert!(json.get("product").is_none());
    }

    #[test]
    fn test_stored_cart_keeps_catalog_fields() {
        let raw = r#"[{"id":1,"title":"a","price":"1.00","image":"x","amount":1,"brand":"Nike","sizes":[38,39]},{"id":2,"price":3,"amount":2}]"#;

        let cart: Cart = serde_json::from_str(raw).unwrap();
        assert_eq!(cart.amount_of(ProductId::new(2)), 2);
        assert_eq!(cart.find(ProductId::new(1)).unwrap().product.extra["brand"], "Nike");
        assert!(!cart.find(ProductId::new(1)).unwrap().product.extra.contains_key("amount"));

        let written: serde_json::Value = serde_json::to_value(&cart).unwrap();
        let expected: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(written[0], expected[0]);
        assert_eq!(written[1]["amount"], 2);
        assert!(written[1].get("title").is_none());
    }

    #[test]
    fn test_new_line_item_ignores_catalog_amount() {
        let product: Product =
            serde_json::from_str(r#"{"id":5,"title":"t","price":2,"amount":40}"#).unwrap();

        let item = CartLineItem::new(product);

        assert_eq!(item.amount, 1);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json.matches("\"amount\"").count(), 1);
    }

    #[test]
    fn test_cart_json_round_trip() {
        let cart = Cart::from_items(vec![item(3, 1), item(1, 4)]).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_from_items_rejects_duplicates_and_zero() {
        assert_eq!(
            Cart::from_items(vec![item(1, 1), item(1, 2)]),
            Err(CartError::DuplicateItem(ProductId::new(1)))
        );
        assert_eq!(
            Cart::from_items(vec![item(2, 0)]),
            Err(CartError::ZeroAmount(ProductId::new(2)))
        );
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.push(item(5, 1)).unwrap();
        cart.push(item(2, 1)).unwrap();
        let ids: Vec<_> = cart.iter().map(CartLineItem::id).collect();
        assert_eq!(ids, vec![ProductId::new(5), ProductId::new(2)]);
        assert!(cart.push(item(5, 1)).is_err());
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_remove_preserves_order_of_remaining() {
        let mut cart = Cart::from_items(vec![item(1, 1), item(2, 1), item(3, 1)]).unwrap();
        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.id(), ProductId::new(2));
        let ids: Vec<_> = cart.iter().map(|i| i.id().as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(cart.remove(ProductId::new(9)).is_none());
    }

    #[test]
    fn test_set_amount() {
        let mut cart = Cart::from_items(vec![item(1, 1)]).unwrap();
        cart.set_amount(ProductId::new(1), 4).unwrap();
        assert_eq!(cart.amount_of(ProductId::new(1)), 4);
        assert_eq!(
            cart.set_amount(ProductId::new(1), 0),
            Err(CartError::ZeroAmount(ProductId::new(1)))
        );
        assert_eq!(
            cart.set_amount(ProductId::new(2), 1),
            Err(CartError::NotFound(ProductId::new(2)))
        );
    }

    #[test]
    fn test_counts_and_subtotal() {
        let cart = Cart::from_items(vec![item(1, 2), item(2, 3)]).unwrap();
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.amount_of(ProductId::new(7)), 0);
        // 2 * 100.01 + 3 * 100.02
        assert_eq!(cart.subtotal(), Price::from_cents(50_008));
    }
}
