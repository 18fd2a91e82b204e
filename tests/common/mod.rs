#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use quillpost::{
    ServerConfig,
    clock::ManualClock,
    create_app,
    db::{Database, Password, PostStore, User, UserStore},
    jwt::{TokenCodec, TokenDomain},
    server_config::AuthSettings,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const ACCESS_LIFETIME: Duration = Duration::from_secs(5);
pub const REFRESH_LIFETIME: Duration = Duration::from_secs(10);
pub const START: u64 = 1_700_000_000;

pub struct TestApp {
    pub app: Router,
    pub users: Arc<UserStore>,
    pub clock: ManualClock,
    /// Codec sharing the app's secrets and clock, for minting tokens directly.
    pub codec: TokenCodec,
}

pub fn settings(secure_cookies: bool) -> AuthSettings {
    AuthSettings::new(
        "test-access-secret",
        "test-refresh-secret",
        ACCESS_LIFETIME,
        REFRESH_LIFETIME,
        secure_cookies,
    )
    .expect("valid test settings")
}

pub fn setup() -> TestApp {
    setup_with_secure(false)
}

pub fn setup_with_secure(secure_cookies: bool) -> TestApp {
    let users = Arc::new(UserStore::new());
    let db = Database::new(users.clone(), Arc::new(PostStore::new()));
    let clock = ManualClock::new(START);
    let auth = settings(secure_cookies);
    let codec = TokenCodec::new(&auth, Arc::new(clock.clone()));

    let config = ServerConfig {
        db,
        auth,
        clock: Arc::new(clock.clone()),
    };

    TestApp {
        app: create_app(&config),
        users,
        clock,
        codec,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Insert a user directly into the store and return its id.
    pub fn create_user(&self, email: &str, password: &str, name: &str) -> String {
        use quillpost::db::UserRepository;

        let user = User::new(email, Password::new(password), name);
        let id = user.id.clone();
        self.users.insert(user).unwrap();
        id
    }

    pub fn token(&self, domain: TokenDomain, user_id: &str) -> String {
        self.codec.issue(domain, user_id).unwrap().into_string()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request with a raw body and no content type.
pub fn plain_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_request_with_cookies(
    method: &str,
    uri: &str,
    cookies: &str,
    body: &str,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("cookie", cookies)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("cookie", cookies)
        .body(Body::empty())
        .unwrap()
}

pub fn auth_cookies(access_token: &str, refresh_token: &str) -> String {
    format!(
        "access_token={}; refresh_token={}",
        access_token, refresh_token
    )
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

/// Value of a cookie being set (not cleared) in the response.
pub fn set_cookie_value(cookies: &[String], cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    cookies
        .iter()
        .filter(|c| !c.contains("Max-Age=0"))
        .filter_map(|c| c.split(';').next())
        .find_map(|pair| pair.strip_prefix(&prefix))
        .map(|value| value.to_string())
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
