pub mod api;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod db;
pub mod jwt;
pub mod server_config;

use api::create_api_router;
use auth::{CookieTransport, apply_auth_cookies};
use axum::{Router, middleware};
use clock::{Clock, SystemClock};
use db::Database;
use jwt::TokenCodec;
use server_config::AuthSettings;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// User and post storage
    pub db: Database,
    /// Token secrets, lifetimes and cookie flags
    pub auth: AuthSettings,
    /// Time source for issuing and checking tokens
    pub clock: Arc<dyn Clock>,
}

impl ServerConfig {
    /// Configuration using the system clock.
    pub fn new(db: Database, auth: AuthSettings) -> Self {
        Self {
            db,
            auth,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let codec = Arc::new(TokenCodec::new(&config.auth, config.clock.clone()));
    let cookies = CookieTransport::new(config.auth.secure_cookies());

    create_api_router(config.db.clone(), codec, cookies)
        .layer(middleware::from_fn(apply_auth_cookies))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
