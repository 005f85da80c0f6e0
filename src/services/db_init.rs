use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique username and unique email. These indexes, not the
    // pre-insert checks, are what make the duplicate-account rule hold under
    // concurrent registrations.
    {
        let col = db.collection::<mongodb::bson::Document>("users");

        let model = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;

        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // orders: query by user quickly and sort by created_at desc
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Seeds the catalog with sample products, unless it already has any.
/// Returns whether anything was inserted.
pub async fn seed_products(db: &Database) -> Result<bool, String> {
    let products = db.collection::<mongodb::bson::Document>("products");

    let existing = products
        .find_one(doc! {}, None)
        .await
        .map_err(|e| e.to_string())?;
    if existing.is_some() {
        return Ok(false);
    }

    let samples = vec![
        doc! { "name": "Tomato", "price": 1.15, "stock": 10_i64 },
        doc! { "name": "Banana", "price": 0.99, "stock": 15_i64 },
        doc! { "name": "Apple", "price": 1.99, "stock": 20_i64 },
    ];

    products
        .insert_many(samples, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(true)
}
