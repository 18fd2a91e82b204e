//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::{Database, Password, User};
use crate::server_config::{AuthSettings, ConfigError};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

const MIN_SECRET_LENGTH: usize = 32;

pub const DEMO_EMAIL: &str = "test@example.com";
pub const DEMO_PASSWORD: &str = "qwe123!!";
pub const DEMO_NAME: &str = "Test User";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "quillpost",
    about = "Short text posts behind cookie-based JWT sessions"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7291")]
    pub port: u16,

    /// Path to file containing the access token secret. Prefer ACCESS_TOKEN_SECRET
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_LIFETIME", default_value = "300")]
    pub access_lifetime_secs: u64,

    /// Refresh token lifetime in seconds (must exceed the access lifetime)
    #[arg(long, env = "REFRESH_TOKEN_LIFETIME", default_value = "1209600")]
    pub refresh_lifetime_secs: u64,

    /// Set the Secure flag on auth cookies (enable behind HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Create test@example.com with a known password on startup
    #[arg(long)]
    pub seed_demo_user: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a signing secret from `env_var` or a file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_secret(env_var: &str, secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: Called during startup before any task is spawned. The
        // runtime's worker threads are idle and nothing else touches the
        // process environment while this runs.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            env_var = %env_var,
            "Secret is required. Set the environment variable (recommended) or pass a secret file"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            env_var = %env_var,
            "Secret is shorter than {} characters. Use a longer secret", MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    args: &Args,
    db: Database,
    access_secret: String,
    refresh_secret: String,
) -> Result<ServerConfig, ConfigError> {
    let auth = AuthSettings::new(
        access_secret,
        refresh_secret,
        Duration::from_secs(args.access_lifetime_secs),
        Duration::from_secs(args.refresh_lifetime_secs),
        args.secure_cookies,
    )?;

    Ok(ServerConfig::new(db, auth))
}

/// Insert the demo account unless its email is already registered.
pub fn seed_demo_user(db: &Database) {
    let user = User::new(DEMO_EMAIL, Password::new(DEMO_PASSWORD), DEMO_NAME);
    let id = user.id.clone();
    match db.users().insert(user) {
        Ok(()) => info!(user_id = %id, email = DEMO_EMAIL, "Demo user created"),
        Err(e) => info!(email = DEMO_EMAIL, reason = %e, "Demo user not created"),
    }
}
