use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub username: String,
    pub email: String,
    pub password_hash: String,

    pub created_at: i64,
}

/// The authenticated identity for the current request. Injected into request
/// extensions by the auth middleware; handlers take it as an explicit
/// parameter instead of reading ambient session state.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: ObjectId,
    pub username: String,
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        CurrentUser {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}
