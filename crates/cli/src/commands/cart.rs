//! Cart commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_API_URL` - Catalog API base URL (needed by `add` and by `update` when it increases)
//! - `STOREFRONT_CART_DIR` - Directory holding the persisted cart
//! - `STOREFRONT_CART_KEY` - Storage key of the cart slot

use std::sync::Arc;

use rocketshoes_core::{Cart, Product, ProductId, Stock};
use rocketshoes_storefront::cart::ops::plan_update;
use rocketshoes_storefront::cart::{CartStore, UpdatePlan, UpdateProductAmount};
use rocketshoes_storefront::catalog::{Catalog, CatalogClient, CatalogError};
use rocketshoes_storefront::config::{CartConfig, CatalogConfig, ConfigError};
use rocketshoes_storefront::notify::LogNotifier;
use rocketshoes_storefront::storage::FileStorage;
use thiserror::Error;

/// Errors that stop a cart command before it runs.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Catalog for commands that never look anything up.
struct Offline;

impl Catalog for Offline {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        Err(CatalogError::NotFound(format!("stock/{id} (offline)")))
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        Err(CatalogError::NotFound(format!("products/{id} (offline)")))
    }
}

fn open<C: Catalog>(catalog: C) -> CartStore<C> {
    let _ = dotenvy::dotenv();
    open_in(catalog, CartConfig::from_env())
}

fn open_in<C: Catalog>(catalog: C, config: CartConfig) -> CartStore<C> {
    tracing::debug!(dir = %config.storage_dir.display(), key = %config.storage_key, "Opening cart");
    CartStore::open(
        catalog,
        Arc::new(FileStorage::new(config.storage_dir)),
        Arc::new(LogNotifier),
        config.storage_key,
    )
}

fn open_online() -> Result<CartStore<CatalogClient>, CommandError> {
    let _ = dotenvy::dotenv();
    let catalog = CatalogClient::new(&CatalogConfig::from_env()?)?;
    Ok(open(catalog))
}

/// Print the persisted cart.
pub fn show() {
    print_cart(&open(Offline).cart());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CommandError` if the catalog client cannot be configured.
pub async fn add(product_id: ProductId) -> Result<(), CommandError> {
    let store = open_online()?;
    store.add_product(product_id).await;
    print_cart(&store.cart());
    Ok(())
}

/// Remove a product.
pub fn remove(product_id: ProductId) {
    let store = open(Offline);
    store.remove_product(product_id);
    print_cart(&store.cart());
}

/// Move a product's amount one unit towards `amount`.
///
/// Only an increase checks the stock, so everything else runs without
/// `STOREFRONT_API_URL`.
///
/// # Errors
///
/// Returns `CommandError` if an increase needs the catalog and the client
/// cannot be configured.
pub async fn update(product_id: ProductId, amount: i64) -> Result<(), CommandError> {
    let update = UpdateProductAmount { product_id, amount };
    let offline = open(Offline);

    if needs_catalog(&offline.cart(), product_id, amount) {
        let store = open_online()?;
        store.update_product_amount(update).await;
        print_cart(&store.cart());
    } else {
        offline.update_product_amount(update).await;
        print_cart(&offline.cart());
    }
    Ok(())
}

/// Whether updating `product_id` towards `amount` has to look up stock.
fn needs_catalog(cart: &Cart, product_id: ProductId, amount: i64) -> bool {
    matches!(plan_update(cart, product_id, amount), UpdatePlan::Increment)
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    for line in render(cart) {
        println!("{line}");
    }
}

/// One line per item plus a total line.
fn render(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|item| {
            format!(
                "{:>3} x {} (#{}) @ {} = {}",
                item.amount,
                item.product.title,
                item.id(),
                item.product.price,
                item.line_total()
            )
        })
        .collect();
    lines.push(format!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    ));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{CartLineItem, Price};
    use rocketshoes_storefront::storage::CartStorage;

    use super::*;

    #[test]
    fn test_only_increases_need_catalog() {
        let cart = Cart::from_items(vec![CartLineItem {
            product: Product::new(ProductId::new(3), "Tênis Runner", Price::from_cents(17_990), ""),
            amount: 3,
        }])
        .unwrap();
        let id = ProductId::new(3);

        assert!(needs_catalog(&cart, id, 5));
        assert!(!needs_catalog(&cart, id, 1));
        assert!(!needs_catalog(&cart, id, 3));
        assert!(!needs_catalog(&cart, id, 0));
        assert!(!needs_catalog(&cart, ProductId::new(9), 2));
    }

    #[tokio::test]
    async fn test_decrement_runs_offline() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path())
            .set(
                "cart",
                r#"[{"id":3,"title":"Tênis Runner","price":"179.90","amount":3}]"#,
            )
            .unwrap();
        let config = CartConfig {
            storage_dir: dir.path().to_path_buf(),
            storage_key: "cart".to_string(),
        };
        let store = open_in(Offline, config);
        let id = ProductId::new(3);
        assert!(!needs_catalog(&store.cart(), id, 1));

        let outcome = store
            .update_product_amount(UpdateProductAmount {
                product_id: id,
                amount: 1,
            })
            .await;

        assert!(outcome.is_updated());
        assert_eq!(store.find(id).unwrap().amount, 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::new()), vec!["Cart is empty".to_string()]);
    }

    #[test]
    fn test_render_items_and_subtotal() {
        let cart = Cart::from_items(vec![CartLineItem {
            product: Product::new(ProductId::new(3), "Tênis Runner", Price::from_cents(17_990), ""),
            amount: 2,
        }])
        .unwrap();

        let lines = render(&cart);
        assert_eq!(lines[0], "  2 x Tênis Runner (#3) @ $179.90 = $359.80");
        assert_eq!(lines[1], "2 item(s), subtotal $359.80");
    }
}
