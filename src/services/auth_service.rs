use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId};

use crate::{error::ShopError, models::User, AppState};

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn make_jwt_with_days(state: &AppState, user_id: &ObjectId, days: i64) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

/// Looks up the user by email and verifies the password against the stored
/// bcrypt hash. A missing account and a wrong password are indistinguishable
/// to the caller.
pub async fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, ShopError> {
    let users = state.db.collection::<User>("users");

    let user = users
        .find_one(doc! { "email": email }, None)
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?
        .ok_or(ShopError::InvalidCredentials)?;

    if !verify(password, &user.password_hash).unwrap_or(false) {
        return Err(ShopError::InvalidCredentials);
    }

    Ok(user)
}

/// Creates a new account. Username and email must both be unused; when either
/// collides the error reports each field separately so the form can flag both.
///
/// The pre-insert check only exists to produce those per-field messages. The
/// unique indexes on `users` are what actually enforce the invariant: if a
/// concurrent registration wins the race between the check and the insert,
/// the duplicate-key error surfaces as `PersistenceConflict`.
pub async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<ObjectId, ShopError> {
    let users = state.db.collection::<User>("users");

    let existing = users
        .find_one(
            doc! { "$or": [ { "username": username }, { "email": email } ] },
            None,
        )
        .await
        .map_err(|e| ShopError::Db(e.to_string()))?;

    if let Some(u) = existing {
        return Err(ShopError::DuplicateAccount {
            username_taken: u.username == username,
            email_taken: u.email == email,
        });
    }

    let pw_hash = hash(password, DEFAULT_COST).map_err(|e| ShopError::Db(e.to_string()))?;

    let insert = state
        .db
        .collection("users")
        .insert_one(
            doc! {
                "username": username,
                "email": email,
                "password_hash": pw_hash,
                "created_at": Utc::now().timestamp(),
            },
            None,
        )
        .await?;

    let new_id = insert
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ShopError::Db("insert returned no id".to_string()))?;

    tracing::info!(user_id = %new_id, "registered new account");

    Ok(new_id)
}
