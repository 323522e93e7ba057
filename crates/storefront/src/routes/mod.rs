//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Health check
//!
//! # Cart (JSON)
//! GET    /api/cart              - Current cart
//! GET    /api/cart/count        - Cart badge count
//! POST   /api/cart/items        - Add one unit of a product
//! GET    /api/cart/items/{id}   - One line item
//! PATCH  /api/cart/items/{id}   - Move a product's amount towards a target
//! DELETE /api/cart/items/{id}   - Remove a product
//! ```

pub mod cart;

use axum::{
    Router,
    extract::Request,
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes<C: Catalog + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(cart::show::<C>))
        .route("/count", get(cart::count::<C>))
        .route("/items", post(cart::add::<C>))
        .route(
            "/items/{id}",
            get(cart::item::<C>)
                .patch(cart::update::<C>)
                .delete(cart::remove::<C>),
        )
}

/// Create all routes for the storefront.
pub fn routes<C: Catalog + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/cart", cart_routes())
}

/// Build the application: routes, state, and the middleware stack.
pub fn app<C: Catalog + 'static>(state: AppState<C>) -> Router {
    routes()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
