//! Cart route handlers.
//!
//! Every mutating endpoint answers `200` with the resulting cart. When the
//! operation was refused (out of stock, product not in the cart, lookup
//! failure) the cart is unchanged and the response carries a `notice` for
//! the UI to show.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rocketshoes_core::{Cart, CartLineItem, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::{CartOperation, CartOutcome, UpdateProductAmount};
use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::notify::Notice;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Update amount request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub amount: i64,
}

/// Notice shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub code: Notice,
    pub message: &'static str,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            code: notice,
            message: notice.message(),
        }
    }
}

/// Cart body returned by every cart endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub items: Cart,
    pub count: u32,
    pub subtotal: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoticeView>,
}

impl CartResponse {
    fn new(cart: Cart, notice: Option<Notice>) -> Self {
        Self {
            count: cart.item_count(),
            subtotal: cart.subtotal(),
            items: cart,
            notice: notice.map(NoticeView::from),
        }
    }
}

/// Cart badge body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountResponse {
    pub count: u32,
}

/// Build the response for a finished operation.
fn respond<C: Catalog>(
    state: &AppState<C>,
    operation: CartOperation,
    outcome: CartOutcome,
) -> Json<CartResponse> {
    let notice = Notice::for_outcome(operation, &outcome);
    let cart = match outcome {
        CartOutcome::Updated(cart) => cart,
        _ => state.cart().cart(),
    };
    Json(CartResponse::new(cart, notice))
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show<C: Catalog>(State(state): State<AppState<C>>) -> Json<CartResponse> {
    Json(CartResponse::new(state.cart().cart(), None))
}

/// Get the cart badge count.
#[instrument(skip(state))]
pub async fn count<C: Catalog>(State(state): State<AppState<C>>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.cart().item_count(),
    })
}

/// Get one line item.
#[instrument(skip(state, id))]
pub async fn item<C: Catalog>(
    State(state): State<AppState<C>>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<CartLineItem>> {
    let Path(id) = id?;
    state
        .cart()
        .find(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id} is not in the cart")))
}

/// Add one unit of a product.
#[instrument(skip(state, payload))]
pub async fn add<C: Catalog>(
    State(state): State<AppState<C>>,
    payload: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>> {
    let Json(request) = payload?;
    let outcome = state.cart().add_product(request.product_id).await;
    Ok(respond(&state, CartOperation::Add, outcome))
}

/// Move a product's amount one unit towards the requested amount.
#[instrument(skip(state, id, payload))]
pub async fn update<C: Catalog>(
    State(state): State<AppState<C>>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    payload: std::result::Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>> {
    let Path(product_id) = id?;
    let Json(request) = payload?;
    let outcome = state
        .cart()
        .update_product_amount(UpdateProductAmount {
            product_id,
            amount: request.amount,
        })
        .await;
    Ok(respond(&state, CartOperation::Update, outcome))
}

/// Remove a product from the cart.
#[instrument(skip(state, id))]
pub async fn remove<C: Catalog + 'static>(
    State(state): State<AppState<C>>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<CartResponse>> {
    let Path(id) = id?;
    // The storage write blocks, keep it off the async workers
    let store = state.clone();
    let outcome = tokio::task::spawn_blocking(move || store.cart().remove_product(id))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Remove task failed");
            CartOutcome::Failed(e.to_string())
        });
    Ok(respond(&state, CartOperation::Remove, outcome))
}
