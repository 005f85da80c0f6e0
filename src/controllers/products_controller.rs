use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ShopError,
    models::CurrentUser,
    render,
    services::catalog_service,
    AppState,
};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

fn page_response(
    state: &AppState,
    headers: &HeaderMap,
    title: &str,
    body: String,
    user: Option<&CurrentUser>,
) -> Response {
    if is_htmx(headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(state, title, body, user) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /products
pub async fn get_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let products = match catalog_service::list_products(&state).await {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let rows: Vec<serde_json::Value> = products
        .iter()
        .map(|p| {
            json!({
                "id": p.id.to_hex(),
                "name": p.name,
                "price": fmt2(p.price),
                "stock": p.stock,
                "in_stock": p.in_stock(),
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/products", &json!({ "products": rows }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    let user_ref = user.as_ref().map(|Extension(u)| u);
    page_response(&state, &headers, "Products", body, user_ref)
}

// ---------------- ADD PRODUCT ----------------

// GET /products/new
pub async fn get_product_new(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let body = state
        .hbs
        .render("pages/product_new", &json!({}))
        .unwrap_or_else(|e| format!("template error: {e}"));

    let user_ref = user.as_ref().map(|Extension(u)| u);
    page_response(&state, &headers, "Add product", body, user_ref)
}

#[derive(Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
}

// POST /products/new
pub async fn post_product_new(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ProductForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("Unauthorized".to_string())).into_response();
    };

    let name = form.name.trim().to_string();
    let price_str = form.price.trim();

    let mut errors = serde_json::Map::new();

    if name.is_empty() {
        errors.insert("name".into(), json!("Product name is required."));
    }

    let price: f64 = match price_str.parse() {
        Ok(p) => p,
        Err(_) => {
            errors.insert("price".into(), json!("Enter a valid price."));
            0.0
        }
    };
    if errors.get("price").is_none() && price < 0.0 {
        errors.insert("price".into(), json!("Price must be zero or more."));
    }

    if errors.is_empty() {
        match catalog_service::create_product(&state, &name, price).await {
            Ok(_) => {
                if is_htmx(&headers) {
                    let mut h = HeaderMap::new();
                    h.insert("HX-Redirect", "/products".parse().unwrap());
                    return (StatusCode::OK, h, Html("".to_string())).into_response();
                }
                return (StatusCode::SEE_OTHER, [("Location", "/products")], Html("".to_string()))
                    .into_response();
            }
            Err(ShopError::Validation(msg)) => {
                errors.insert("_form".into(), json!(msg));
            }
            Err(e) => {
                errors.insert("_form".into(), json!(format!("db error: {e}")));
            }
        }
    }

    let body = state
        .hbs
        .render(
            "pages/product_new",
            &json!({
                "values": {"name": name, "price": price_str},
                "errors": errors
            }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    page_response(&state, &headers, "Add product", body, Some(&u))
}

// ---------------- RESTOCK ----------------

// GET /products/:id/restock
pub async fn get_restock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Ok(oid) = ObjectId::parse_str(&product_id) else {
        return (StatusCode::NOT_FOUND, Html("Not found".to_string())).into_response();
    };

    let product = match catalog_service::get_product(&state, oid).await {
        Ok(p) => p,
        Err(ShopError::NotFound(_)) => {
            return (StatusCode::NOT_FOUND, Html("Not found".to_string())).into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let body = state
        .hbs
        .render(
            "pages/restock",
            &json!({
                "product": {
                    "id": product.id.to_hex(),
                    "name": product.name,
                    "stock": product.stock,
                }
            }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    let user_ref = user.as_ref().map(|Extension(u)| u);
    page_response(&state, &headers, "Restock", body, user_ref)
}

#[derive(Deserialize)]
pub struct RestockForm {
    pub amount: String,
}

// POST /products/:id/restock
pub async fn post_restock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<RestockForm>,
) -> Response {
    let Some(Extension(_u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("Unauthorized".to_string())).into_response();
    };

    let Ok(oid) = ObjectId::parse_str(&product_id) else {
        return (StatusCode::NOT_FOUND, Html("Not found".to_string())).into_response();
    };

    let amount: i64 = match form.amount.trim().parse() {
        Ok(a) => a,
        Err(_) => {
            return (
                StatusCode::OK,
                Html(r#"<div class="text-danger">Enter a valid amount.</div>"#.to_string()),
            )
                .into_response();
        }
    };

    match catalog_service::restock(&state, oid, amount).await {
        Ok(product) => {
            if is_htmx(&headers) {
                return (
                    StatusCode::OK,
                    Html(format!(
                        r#"<div class="text-success">Restocked {} (now {} in stock)</div>"#,
                        product.name, product.stock
                    )),
                )
                    .into_response();
            }
            (StatusCode::SEE_OTHER, [("Location", "/products")], Html("".to_string()))
                .into_response()
        }
        Err(ShopError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Html("Not found".to_string())).into_response()
        }
        Err(ShopError::Validation(msg)) => (
            StatusCode::OK,
            Html(format!(r#"<div class="text-danger">{msg}</div>"#)),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}
