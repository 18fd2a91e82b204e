//! Posts API.
//!
//! Creating a post requires authentication; listing is public and marks the
//! viewer's own posts when a session is present.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::body_or_default;
use super::error::{ApiError, required};
use crate::auth::{Auth, CookieTransport, OptionalAuth};
use crate::db::{Database, NewPost, Post};
use crate::impl_has_auth_backend;
use crate::jwt::TokenCodec;

/// Characters of content shown in a listing before truncation.
const PREVIEW_CHARS: usize = 60;

/// Shown when a post's author no longer exists.
const UNKNOWN_AUTHOR: &str = "Unknown";

/// State for posts endpoints.
#[derive(Clone)]
pub struct PostsState {
    pub db: Database,
    pub codec: Arc<TokenCodec>,
    pub cookies: CookieTransport,
}

impl_has_auth_backend!(PostsState);

pub fn router(state: PostsState) -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize, Default)]
struct CreatePostRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    id: u64,
    title: String,
    content: String,
    author_id: String,
    created_at: String,
}

#[derive(Serialize)]
struct CreatePostResponse {
    ok: bool,
    post: PostResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostSummaryResponse {
    id: u64,
    title: String,
    preview: String,
    author_name: String,
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mine: Option<bool>,
}

// --- Helpers ---

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First [`PREVIEW_CHARS`] characters, with "..." appended when cut.
fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            created_at: timestamp(&post.created_at),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
        }
    }
}

// --- Handlers ---

async fn list_posts(
    State(state): State<PostsState>,
    OptionalAuth(viewer): OptionalAuth,
) -> impl IntoResponse {
    let summaries: Vec<PostSummaryResponse> = state
        .db
        .posts()
        .list()
        .into_iter()
        .map(|post| {
            let author_name = state
                .db
                .users()
                .find_by_id(&post.author_id)
                .map(|user| user.name)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

            PostSummaryResponse {
                id: post.id,
                preview: preview(&post.content),
                created_at: timestamp(&post.created_at),
                mine: viewer.as_ref().map(|v| v.user_id == post.author_id),
                title: post.title,
                author_name,
            }
        })
        .collect();

    Json(summaries)
}

async fn create_post(
    State(state): State<PostsState>,
    Auth(identity): Auth,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: CreatePostRequest = body_or_default(&body);
    let (Some(title), Some(content)) = (required(&payload.title), required(&payload.content))
    else {
        return Err(ApiError::bad_request("title and content are required"));
    };

    let post = state.db.posts().create(NewPost {
        title: title.to_string(),
        content: content.to_string(),
        author_id: identity.user_id,
    });
    tracing::debug!(post_id = post.id, author_id = %post.author_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            ok: true,
            post: post.into(),
        }),
    ))
}
