//! Token management API endpoints.
//!
//! - POST `/auth/refresh` - Exchange a refresh token for a new access token
//! - POST `/auth/logout` - Clear both cookies

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::body_or_default;
use super::error::{ApiError, ResultExt};
use crate::auth::{CookieTransport, REFRESH_COOKIE_NAME, get_cookie};
use crate::db::Database;
use crate::jwt::{TokenCodec, TokenDomain};

#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub codec: Arc<TokenCodec>,
    pub cookies: CookieTransport,
}

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Issue a new access token from a refresh token.
/// The token comes from the JSON body (`refreshToken`), falling back to the
/// refresh cookie. The refresh token itself is not rotated.
async fn refresh_token(
    State(state): State<TokensState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let requested: RefreshRequest = body_or_default(&body);
    let refresh_token = requested
        .refresh_token
        .as_deref()
        .or_else(|| get_cookie(&headers, REFRESH_COOKIE_NAME))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("No refresh token"))?;

    let user_id = state
        .codec
        .verify(TokenDomain::Refresh, refresh_token)
        .map_err(|e| {
            debug!(reason = %e, "Explicit refresh rejected");
            ApiError::unauthorized("Invalid refresh token")
        })?;

    if state.db.users().find_by_id(&user_id).is_none() {
        return Err(ApiError::unauthorized("User not found for refresh token"));
    }

    let access = state
        .codec
        .issue(TokenDomain::Access, &user_id)
        .internal_err("Failed to generate access token")?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, state.cookies.set_access(&access))],
        Json(RefreshResponse {
            access_token: access.into_string(),
        }),
    ))
}

/// Clear both cookies. Always succeeds.
async fn logout(State(state): State<TokensState>) -> impl IntoResponse {
    let [clear_access, clear_refresh] = state.cookies.clear_both();

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(serde_json::json!({ "ok": true })),
    )
}
