use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub product_id: ObjectId,

    pub quantity: i64,

    // price per unit at the time the order was placed
    pub unit_price: f64,
    pub total: f64,

    pub created_at: i64,
}
