//! Cookie-based JWT authentication.
//!
//! Dual-token system: short-lived access tokens trusted on sight and
//! long-lived refresh tokens that mint new access tokens after checking the
//! user still exists. Expired access tokens are replaced silently by the
//! extractors; the new cookie is written by [`apply_auth_cookies`].

mod cookie;
mod errors;
mod extractors;
mod machine;
mod state;
mod types;

pub use cookie::{
    ACCESS_COOKIE_NAME, CookieTransport, Credentials, REFRESH_COOKIE_NAME, append_set_cookies,
    get_cookie,
};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{Auth, OptionalAuth, PENDING_AUTH_COOKIES, apply_auth_cookies};
pub use machine::{Outcome, Resolution, resolve};
pub use state::HasAuthBackend;
pub use types::{AuthMode, CookieEffect, ResolvedIdentity};
