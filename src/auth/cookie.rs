//! Cookie transport for the credential pair.
//!
//! Tokens travel in two `HttpOnly`, `SameSite=Lax` cookies scoped to `/`.
//! The transport only carries token strings; it never looks inside them.

use axum::http::{HeaderMap, HeaderValue, header};

use crate::jwt::{CredentialPair, SignedToken};

/// Cookie name for the access token (short-lived).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Token values presented by the client. Empty cookies count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub access: Option<&'a str>,
    pub refresh: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let non_empty = |name: &str| get_cookie(headers, name).filter(|v| !v.is_empty());
        Self {
            access: non_empty(ACCESS_COOKIE_NAME),
            refresh: non_empty(REFRESH_COOKIE_NAME),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Builds `Set-Cookie` values for the auth cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieTransport {
    secure: bool,
}

impl CookieTransport {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn secure_attr(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }

    fn set(&self, name: &str, token: &SignedToken) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            name,
            token.as_str(),
            token.lifetime(),
            self.secure_attr()
        )
    }

    fn clear(&self, name: &str) -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
            name,
            self.secure_attr()
        )
    }

    pub fn set_access(&self, token: &SignedToken) -> String {
        self.set(ACCESS_COOKIE_NAME, token)
    }

    pub fn set_refresh(&self, token: &SignedToken) -> String {
        self.set(REFRESH_COOKIE_NAME, token)
    }

    pub fn set_pair(&self, pair: &CredentialPair) -> [String; 2] {
        [self.set_access(&pair.access), self.set_refresh(&pair.refresh)]
    }

    /// Expire both auth cookies. Safe to send when neither is set.
    pub fn clear_both(&self) -> [String; 2] {
        [self.clear(ACCESS_COOKIE_NAME), self.clear(REFRESH_COOKIE_NAME)]
    }
}

/// Append `Set-Cookie` headers, skipping values that are not valid header text.
pub fn append_set_cookies<I>(headers: &mut HeaderMap, cookies: I)
where
    I: IntoIterator<Item = String>,
{
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping malformed Set-Cookie value"),
        }
    }
}
