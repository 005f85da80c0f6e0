use std::collections::HashMap;

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{
    error::ShopError,
    models::{Order, Product},
    AppState,
};

use super::catalog_service;

/// What the view layer gets back after a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: ObjectId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
    pub remaining_stock: i64,
}

/// An order joined with its product's name, for the history page.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
    pub created_at: String,
}

/// Places an order for the given user: decrement stock, then record the
/// order. The decrement is the atomic guard (see
/// `catalog_service::reduce_stock`), so an insufficient-stock order never
/// creates a record and never touches the product. If the order insert fails
/// after the decrement, the units are put back before the error is returned,
/// so stock and ledger stay consistent.
pub async fn place_order(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
    quantity: i64,
) -> Result<PlacedOrder, ShopError> {
    if quantity < 1 {
        return Err(ShopError::Validation("Quantity must be at least 1.".into()));
    }

    // Fetch up front so a missing product reports NotFound rather than an
    // insufficient-stock failure.
    let product = catalog_service::get_product(state, product_id).await?;

    let product = catalog_service::reduce_stock(state, product.id, quantity).await?;

    let total = product.price * (quantity as f64);
    let order = Order {
        id: ObjectId::new(),
        user_id,
        product_id: product.id,
        quantity,
        unit_price: product.price,
        total,
        created_at: Utc::now().timestamp(),
    };

    let orders = state.db.collection::<Order>("orders");
    if let Err(e) = orders.insert_one(&order, None).await {
        // Stock was already drawn down; put the units back so no partial
        // state survives the failed placement.
        if let Err(restore) = catalog_service::restock(state, product.id, quantity).await {
            tracing::error!(
                product_id = %product.id,
                quantity,
                error = %restore,
                "failed to restore stock after order insert error"
            );
        }
        return Err(ShopError::Db(e.to_string()));
    }

    tracing::info!(
        order_id = %order.id,
        %user_id,
        product = %product.name,
        quantity,
        "order placed"
    );

    Ok(PlacedOrder {
        order_id: order.id,
        product_name: product.name,
        quantity,
        unit_price: order.unit_price,
        total,
        remaining_stock: product.stock,
    })
}

/// The current user's order history, newest first, with product names
/// resolved for display.
pub async fn list_user_orders(state: &AppState, user_id: ObjectId) -> Result<Vec<OrderView>, ShopError> {
    let orders = state.db.collection::<Order>("orders");
    let find_opts = FindOptions::builder().sort(doc! { "created_at": -1 }).build();

    let mut cursor = orders
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?;

    let mut out: Vec<Order> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res.map_err(|e| ShopError::Db(e.to_string()))?);
    }

    let product_ids: Vec<ObjectId> = out.iter().map(|o| o.product_id).collect();
    let names = product_names(state, &product_ids).await?;

    Ok(out
        .into_iter()
        .map(|o| OrderView {
            product_name: names
                .get(&o.product_id)
                .cloned()
                .unwrap_or_else(|| "(removed product)".to_string()),
            quantity: o.quantity,
            unit_price: o.unit_price,
            total: o.total,
            created_at: format_ts(o.created_at),
        })
        .collect())
}

async fn product_names(
    state: &AppState,
    ids: &[ObjectId],
) -> Result<HashMap<ObjectId, String>, ShopError> {
    let mut names = HashMap::new();
    if ids.is_empty() {
        return Ok(names);
    }

    let products = state.db.collection::<Product>("products");
    let mut cursor = products
        .find(doc! { "_id": { "$in": ids } }, None)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?;

    while let Some(res) = cursor.next().await {
        let p = res.map_err(|e| ShopError::Db(e.to_string()))?;
        names.insert(p.id, p.name);
    }
    Ok(names)
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
