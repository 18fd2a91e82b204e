mod error;
mod posts;
mod tokens;
mod users;

use axum::{Json, Router, routing::get};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::CookieTransport;
use crate::db::Database;
use crate::jwt::TokenCodec;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(db: Database, codec: Arc<TokenCodec>, cookies: CookieTransport) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        codec: codec.clone(),
        cookies,
    };

    let tokens_state = tokens::TokensState {
        db: db.clone(),
        codec: codec.clone(),
        cookies,
    };

    let posts_state = posts::PostsState { db, codec, cookies };

    Router::new()
        .route("/", get(hello))
        .merge(users::router(users_state))
        .merge(tokens::router(tokens_state))
        .nest("/posts", posts::router(posts_state))
}

/// Parse a JSON request body, treating a missing or unparseable body as empty.
///
/// Field validation then reports what is missing with a 400, instead of the
/// extractor rejecting the request before the handler runs.
fn body_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

async fn hello() -> Json<&'static str> {
    Json("Hello, World")
}
