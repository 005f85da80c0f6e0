use axum::{
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use mongodb::{bson::oid::ObjectId, Client};
use rustgrocer::{controllers::orders_controller, config, templates, AppState};
use rustgrocer::models::CurrentUser;
use tower::ServiceExt;

async fn test_state() -> AppState {
    let settings = config::load();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    AppState {
        hbs: templates::build_handlebars(),
        db,
        settings,
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn current_user() -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        username: "test".to_string(),
        email: "test@example.com".to_string(),
    }
}

#[tokio::test]
async fn post_order_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders", post(orders_controller::post_order))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(format!(
            "product_id={}&quantity=1",
            ObjectId::new().to_hex()
        )))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = response_body_string(res).await;
    assert!(body.to_lowercase().contains("unauthorized"));
}

#[tokio::test]
async fn post_order_invalid_quantity_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders", post(orders_controller::post_order))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(format!(
            "product_id={}&quantity=notanumber",
            ObjectId::new().to_hex()
        )))
        .unwrap();

    // Add authenticated user (so we hit the quantity parse branch, not unauthorized).
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Enter a valid quantity"));
}

#[tokio::test]
async fn post_order_zero_quantity_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders", post(orders_controller::post_order))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(format!(
            "product_id={}&quantity=0",
            ObjectId::new().to_hex()
        )))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Quantity must be at least 1."));
}

#[tokio::test]
async fn post_order_negative_quantity_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders", post(orders_controller::post_order))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(format!(
            "product_id={}&quantity=-3",
            ObjectId::new().to_hex()
        )))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Quantity must be at least 1."));
}

#[tokio::test]
async fn post_order_malformed_product_id_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders", post(orders_controller::post_order))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("product_id=not-an-id&quantity=1"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Choose a product."));
}

#[tokio::test]
async fn get_order_history_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders/history", get(orders_controller::get_order_history))
        .with_state(state);

    let req = Request::builder()
        .method("GET")
        .uri("/orders/history")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
