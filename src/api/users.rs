//! Account endpoints.
//!
//! - POST `/auth/signup` - Create a user and log them in
//! - POST `/auth/login` - Exchange email and password for a credential pair
//! - GET `/me` - Current user

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::body_or_default;
use super::error::{ApiError, ResultExt, required};
use crate::auth::{Auth, CookieTransport};
use crate::db::{Database, Password, User};
use crate::impl_has_auth_backend;
use crate::jwt::TokenCodec;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub codec: Arc<TokenCodec>,
    pub cookies: CookieTransport,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize, Default)]
struct SignupRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct UserResponse {
    id: String,
    email: String,
    name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Serialize)]
struct SignupResponse {
    ok: bool,
    user: UserResponse,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

async fn signup(
    State(state): State<UsersState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: SignupRequest = body_or_default(&body);
    let (Some(email), Some(password), Some(name)) = (
        required(&payload.email),
        required(&payload.password),
        required(&payload.name),
    ) else {
        return Err(ApiError::bad_request("email, password and name are required"));
    };

    if state.db.users().find_by_email(email).is_some() {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let user = User::new(email, Password::new(password), name);
    let pair = state
        .codec
        .issue_pair(&user.id)
        .internal_err("Failed to generate tokens")?;

    // Insert re-checks the email under the write lock.
    state.db.users().insert(user.clone())?;
    info!(user_id = %user.id, "User signed up");

    let [access_cookie, refresh_cookie] = state.cookies.set_pair(&pair);
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(SignupResponse {
            ok: true,
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<UsersState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: LoginRequest = body_or_default(&body);
    let (Some(email), Some(password)) = (required(&payload.email), required(&payload.password))
    else {
        return Err(ApiError::bad_request("email and password are required"));
    };

    let user = state
        .db
        .users()
        .find_by_email(email)
        .filter(|user| user.password.matches(password))
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let pair = state
        .codec
        .issue_pair(&user.id)
        .internal_err("Failed to generate tokens")?;
    info!(user_id = %user.id, "User logged in");

    let [access_cookie, refresh_cookie] = state.cookies.set_pair(&pair);
    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(OkResponse { ok: true }),
    ))
}

async fn me(
    State(state): State<UsersState>,
    Auth(identity): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .find_by_id(&identity.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}
