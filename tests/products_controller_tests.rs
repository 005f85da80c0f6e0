use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::{bson::oid::ObjectId, Client};
use rustgrocer::{controllers::products_controller, config, templates, AppState};
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
async fn post_restock_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/:id/restock", post(products_controller::post_restock))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/products/{}/restock", ObjectId::new().to_hex()))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("amount=5"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_restock_invalid_amount_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/:id/restock", post(products_controller::post_restock))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri(format!("/products/{}/restock", ObjectId::new().to_hex()))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("amount=lots"))
        .unwrap();

    // Add authenticated user (so we hit the amount parse branch, not unauthorized).
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Enter a valid amount."));
}

#[tokio::test]
async fn post_restock_zero_amount_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/:id/restock", post(products_controller::post_restock))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri(format!("/products/{}/restock", ObjectId::new().to_hex()))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("amount=0"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Restock amount must be at least 1."));
}

#[tokio::test]
async fn post_restock_malformed_id_returns_404() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/:id/restock", post(products_controller::post_restock))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/products/not-an-id/restock")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("amount=5"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_product_new_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/new", post(products_controller::post_product_new))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/products/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("name=Tomato&price=1.15"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_product_new_missing_name_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/new", post(products_controller::post_product_new))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/products/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("name=&price=1.15"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Product name is required."));
}

#[tokio::test]
async fn post_product_new_negative_price_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/new", post(products_controller::post_product_new))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/products/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("name=Tomato&price=-2"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Price must be zero or more."));
}

#[tokio::test]
async fn post_product_new_unparseable_price_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/products/new", post(products_controller::post_product_new))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/products/new")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("name=Tomato&price=cheap"))
        .unwrap();

    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Enter a valid price."));
}
