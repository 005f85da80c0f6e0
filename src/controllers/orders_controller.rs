use axum::{
    extract::{Extension, State},
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
    services::{catalog_service, order_service},
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

fn error_snippet(msg: &str) -> Response {
    (
        StatusCode::OK,
        Html(format!(r#"<div class="text-danger">{msg}</div>"#)),
    )
        .into_response()
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

// GET /orders (the place-order form, offering whatever is still in stock)
pub async fn get_order_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let available = match catalog_service::list_available(&state).await {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let options: Vec<serde_json::Value> = available
        .iter()
        .map(|p| {
            json!({
                "id": p.id.to_hex(),
                "label": format!("{} (${}) - {} left", p.name, fmt2(p.price), p.stock),
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/orders", &json!({ "products": options }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    let user_ref = user.as_ref().map(|Extension(u)| u);
    page_response(&state, &headers, "Place order", body, user_ref)
}

#[derive(Deserialize)]
pub struct OrderForm {
    pub product_id: String,
    pub quantity: String,
}

// POST /orders
pub async fn post_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<OrderForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("Unauthorized".to_string())).into_response();
    };

    let Ok(product_id) = ObjectId::parse_str(form.product_id.trim()) else {
        return error_snippet("Choose a product.");
    };

    let quantity: i64 = match form.quantity.trim().parse() {
        Ok(q) => q,
        Err(_) => {
            return error_snippet("Enter a valid quantity.");
        }
    };

    let placed = match order_service::place_order(&state, u.id, product_id, quantity).await {
        Ok(p) => p,
        Err(ShopError::InsufficientStock) => {
            return error_snippet("Not enough stock available!");
        }
        Err(ShopError::NotFound(_)) => {
            return error_snippet("This product no longer exists.");
        }
        Err(ShopError::PersistenceConflict) => {
            return error_snippet("The shop is busy, please try again.");
        }
        Err(ShopError::Validation(msg)) => {
            return error_snippet(&msg);
        }
        Err(e) => {
            return error_snippet(&format!("db error: {e}"));
        }
    };

    if is_htmx(&headers) {
        return (
            StatusCode::OK,
            Html(format!(
                r#"<div class="text-success">Ordered {} x {} (Total: ${}, {} left in stock)</div>"#,
                placed.quantity,
                placed.product_name,
                fmt2(placed.total),
                placed.remaining_stock
            )),
        )
            .into_response();
    }

    (
        StatusCode::SEE_OTHER,
        [("Location", "/orders/history")],
        Html("".to_string()),
    )
        .into_response()
}

// GET /orders/history
pub async fn get_order_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (StatusCode::UNAUTHORIZED, Html("Unauthorized".to_string())).into_response();
    };

    let orders = match order_service::list_user_orders(&state, u.id).await {
        Ok(o) => o,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let rows: Vec<serde_json::Value> = orders
        .iter()
        .map(|o| {
            json!({
                "product_name": o.product_name,
                "quantity": o.quantity,
                "unit_price": fmt2(o.unit_price),
                "total": fmt2(o.total),
                "created_at": o.created_at,
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/order_history", &json!({ "orders": rows }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    page_response(&state, &headers, "My orders", body, Some(&u))
}
