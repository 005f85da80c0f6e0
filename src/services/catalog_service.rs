use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use crate::{error::ShopError, models::Product, AppState};

/// New products start with a small amount on the shelf.
pub const DEFAULT_STOCK: i64 = 10;

/// How many times a stock reduction re-reads and retries after losing a
/// write race before giving up.
const STOCK_CAS_ATTEMPTS: usize = 4;

pub async fn get_product(state: &AppState, product_id: ObjectId) -> Result<Product, ShopError> {
    let products = state.db.collection::<Product>("products");
    products
        .find_one(doc! { "_id": product_id }, None)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?
        .ok_or(ShopError::NotFound("product"))
}

pub async fn list_products(state: &AppState) -> Result<Vec<Product>, ShopError> {
    let products = state.db.collection::<Product>("products");
    let mut cursor = products
        .find(doc! {}, None)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?;

    let mut out: Vec<Product> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res.map_err(|e| ShopError::Db(e.to_string()))?);
    }
    Ok(out)
}

/// Products the order form can offer (anything still on the shelf).
pub async fn list_available(state: &AppState) -> Result<Vec<Product>, ShopError> {
    let products = state.db.collection::<Product>("products");
    let mut cursor = products
        .find(doc! { "stock": { "$gt": 0 } }, None)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?;

    let mut out: Vec<Product> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res.map_err(|e| ShopError::Db(e.to_string()))?);
    }
    Ok(out)
}

pub async fn create_product(state: &AppState, name: &str, price: f64) -> Result<ObjectId, ShopError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShopError::Validation("Product name is required.".into()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ShopError::Validation("Price must be zero or more.".into()));
    }

    let insert = state
        .db
        .collection("products")
        .insert_one(
            doc! {
                "name": name,
                "price": price,
                "stock": DEFAULT_STOCK,
            },
            None,
        )
        .await?;

    insert
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ShopError::Db("insert returned no id".to_string()))
}

/// Adds `amount` units to the product's stock and returns the updated
/// product. Always succeeds for an existing product; `$inc` is atomic so
/// concurrent restocks and reductions never lose each other's updates.
pub async fn restock(state: &AppState, product_id: ObjectId, amount: i64) -> Result<Product, ShopError> {
    if amount < 1 {
        return Err(ShopError::Validation("Restock amount must be at least 1.".into()));
    }

    let products = state.db.collection::<Product>("products");
    products
        .find_one_and_update(
            doc! { "_id": product_id },
            doc! { "$inc": { "stock": amount } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?
        .ok_or(ShopError::NotFound("product"))
}

/// Removes `amount` units from the product's stock, or fails with
/// `InsufficientStock` leaving the stock untouched.
///
/// Concurrent reductions on the same product serialize through an optimistic
/// compare-and-swap: the update is guarded on the stock value we read, so a
/// racing writer makes the update match nothing and we re-read and retry.
/// Two simultaneous orders can therefore never both draw down the same units.
pub async fn reduce_stock(
    state: &AppState,
    product_id: ObjectId,
    amount: i64,
) -> Result<Product, ShopError> {
    if amount < 1 {
        return Err(ShopError::Validation("Quantity must be at least 1.".into()));
    }

    let products = state.db.collection::<Product>("products");

    for _ in 0..STOCK_CAS_ATTEMPTS {
        let mut product = get_product(state, product_id).await?;

        let new_stock = product
            .stock_after_reduction(amount)
            .ok_or(ShopError::InsufficientStock)?;

        let res = products
            .update_one(
                doc! { "_id": product_id, "stock": product.stock },
                doc! { "$set": { "stock": new_stock } },
                None,
            )
            .await
            .map_err(|e| ShopError::Db(e.to_string()))?;

        if res.modified_count == 1 {
            product.stock = new_stock;
            return Ok(product);
        }

        // Lost the race; stock changed under us. Re-read and try again.
        tracing::debug!(%product_id, "stock CAS lost, retrying");
    }

    Err(ShopError::PersistenceConflict)
}
