//! Product and stock records as served by the catalog API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Price, ProductId};

/// A product as returned by `GET /products/{id}`.
///
/// The cart never interprets the display fields; they are carried into the
/// line item so the UI can render it without another lookup. Only `id` and
/// `price` are required. Fields the catalog sends beyond the known ones are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra catalog fields.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// Stock availability as returned by `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Units available for purchase.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be taken from this stock.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_unknown_fields() {
        let raw = r#"{"id":1,"title":"Tênis","price":179.9,"image":"x.jpg","brand":"Nike","sizes":[38,39]}"#;
        let product: Product = serde_json::from_str(raw).unwrap();

        assert_eq!(product.extra["brand"], "Nike");
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["sizes"], serde_json::json!([38, 39]));
        assert_eq!(json["title"], "Tênis");
    }

    #[test]
    fn test_product_display_fields_are_optional() {
        let product: Product = serde_json::from_str(r#"{"id":2,"title":"b","price":1}"#).unwrap();

        assert_eq!(product.title, "b");
        assert!(product.image.is_empty());
        assert_eq!(product.price, Price::from_cents(100));
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 2,
        };
        assert!(stock.covers(2));
        assert!(!stock.covers(3));
    }
}
