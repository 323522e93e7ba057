//! Integration tests for the JSON cart API.
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`, backed by the stub catalog.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rocketshoes_integration_tests::{Harness, StubCatalog};
use rocketshoes_storefront::routes;
use rocketshoes_storefront::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(catalog: StubCatalog) -> Router {
    let Harness { store, .. } = Harness::new(catalog);
    routes::app(AppState::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn add(app: &Router, product_id: i32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "product_id": product_id })),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = app(StubCatalog::new());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_cart() {
    let app = app(StubCatalog::new());

    let (status, body) = send(&app, Method::GET, "/api/cart", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["count"], 0);
    assert!(body.get("notice").is_none());
}

#[tokio::test]
async fn test_add_returns_cart_with_line_item() {
    let app = app(StubCatalog::new().with_stock(1, 3));

    add(&app, 1).await;
    let (status, body) = add(&app, 1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["subtotal"], "220.00");
    let item = &body["items"][0];
    assert_eq!(item["id"], 1);
    assert_eq!(item["title"], "Tênis 1");
    assert_eq!(item["amount"], 2);
    assert!(body.get("notice").is_none());
}

#[tokio::test]
async fn test_add_out_of_stock_carries_notice() {
    let app = app(StubCatalog::new().with_stock(1, 1));
    add(&app, 1).await;

    let (status, body) = add(&app, 1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["amount"], 1);
    assert_eq!(body["notice"]["code"], "add_out_of_stock");
    assert_eq!(
        body["notice"]["message"],
        "Requested quantity is out of stock"
    );
}

#[tokio::test]
async fn test_add_rejects_malformed_body() {
    let app = app(StubCatalog::new().with_stock(1, 1));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "product": "one" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
}

#[tokio::test]
async fn test_count() {
    let app = app(StubCatalog::new().with_stock(1, 5).with_stock(2, 5));
    add(&app, 1).await;
    add(&app, 1).await;
    add(&app, 2).await;

    let (status, body) = send(&app, Method::GET, "/api/cart/count", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 3 }));
}

#[tokio::test]
async fn test_item_lookup() {
    let app = app(StubCatalog::new().with_stock(2, 5));
    add(&app, 2).await;

    let (status, body) = send(&app, Method::GET, "/api/cart/items/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["amount"], 1);

    let (status, body) = send(&app, Method::GET, "/api/cart/items/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not in the cart"));

    let (status, _) = send(&app, Method::GET, "/api/cart/items/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_moves_one_step() {
    let app = app(StubCatalog::new().with_stock(1, 10));
    add(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/cart/items/1",
        Some(json!({ "amount": 4 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["amount"], 2);
    assert!(body.get("notice").is_none());
}

#[tokio::test]
async fn test_update_out_of_stock_carries_notice() {
    let app = app(StubCatalog::new().with_stock(1, 2));
    add(&app, 1).await;

    let (_, body) = send(
        &app,
        Method::PATCH,
        "/api/cart/items/1",
        Some(json!({ "amount": 3 })),
    )
    .await;

    assert_eq!(body["items"][0]["amount"], 1);
    assert_eq!(body["notice"]["code"], "update_out_of_stock");
}

#[tokio::test]
async fn test_update_below_one_is_ignored() {
    let app = app(StubCatalog::new().with_stock(1, 2));
    add(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/cart/items/1",
        Some(json!({ "amount": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["amount"], 1);
    assert!(body.get("notice").is_none());
}

#[tokio::test]
async fn test_update_absent_product_carries_notice() {
    let app = app(StubCatalog::new().with_stock(1, 2));

    let (_, body) = send(
        &app,
        Method::PATCH,
        "/api/cart/items/1",
        Some(json!({ "amount": 2 })),
    )
    .await;

    assert_eq!(body["items"], json!([]));
    assert_eq!(body["notice"]["code"], "update_failed");
}

#[tokio::test]
async fn test_remove() {
    let app = app(StubCatalog::new().with_stock(1, 2).with_stock(2, 2));
    add(&app, 1).await;
    add(&app, 2).await;

    let (status, body) = send(&app, Method::DELETE, "/api/cart/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], 2);

    let (status, body) = send(&app, Method::DELETE, "/api/cart/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["code"], "remove_failed");
    assert_eq!(body["notice"]["message"], "Error removing product");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app(StubCatalog::new());

    let response = app
        .oneshot(
            Request::get("/api/cart/count")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
