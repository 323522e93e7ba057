//! Product and stock lookups.
//!
//! # Architecture
//!
//! - The catalog API is the source of truth for stock - NO local stock
//!   tracking; every admission check hits the API
//! - Product details are cached in memory via `moka` (5 minute TTL by default)
//! - The cart depends on the [`Catalog`] trait, so tests swap in an in-memory
//!   catalog
//!
//! # Endpoints
//!
//! - `GET {base}/stock/{id}` → `{"id": 1, "amount": 3}`
//! - `GET {base}/products/{id}` → `{"id": 1, "title": "...", "price": 179.9, "image": "..."}`

mod client;

pub use client::CatalogClient;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured API token is not a valid header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),
}

/// Remote product and stock lookups keyed by product ID.
pub trait Catalog: Send + Sync {
    /// Units of a product currently available.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Full product details, used when a product first enters the cart.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;
}
