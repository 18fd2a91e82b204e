//! Axum extractors for authentication.

use std::cell::RefCell;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::cookie::{CookieTransport, Credentials, append_set_cookies};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::machine::{Outcome, Resolution, resolve};
use super::state::HasAuthBackend;
use super::types::{AuthMode, CookieEffect, ResolvedIdentity};

tokio::task_local! {
    /// Set-Cookie values produced by the extractors while the handler runs.
    /// Written to the response by [`apply_auth_cookies`].
    pub static PENDING_AUTH_COOKIES: RefCell<Vec<String>>;
}

fn authenticate_request<S>(parts: &Parts, state: &S, mode: AuthMode) -> Resolution
where
    S: HasAuthBackend + Send + Sync,
{
    let credentials = Credentials::from_headers(&parts.headers);
    resolve(mode, credentials, state.codec(), state.db().users())
}

/// Queue the cookie side effect for the response middleware.
fn defer_cookie_effect(transport: CookieTransport, effect: CookieEffect) {
    let cookies: Vec<String> = match effect {
        CookieEffect::None => return,
        CookieEffect::RotateAccess(token) => vec![transport.set_access(&token)],
        CookieEffect::ClearBoth => transport.clear_both().into(),
    };

    if PENDING_AUTH_COOKIES
        .try_with(|cell| cell.borrow_mut().extend(cookies))
        .is_err()
    {
        tracing::warn!("Auth cookie update dropped: apply_auth_cookies layer not installed");
    }
}

/// Response middleware that writes cookies queued by the auth extractors.
pub async fn apply_auth_cookies(request: Request, next: Next) -> Response {
    PENDING_AUTH_COOKIES
        .scope(RefCell::new(Vec::new()), async move {
            let mut response = next.run(request).await;
            let cookies = PENDING_AUTH_COOKIES.with(|cell| cell.take());
            append_set_cookies(response.headers_mut(), cookies);
            response
        })
        .await
}

fn rejection(kind: AuthErrorKind, effect: CookieEffect, transport: CookieTransport) -> ApiAuthError {
    let err = ApiAuthError::new(kind, effect.clears(), transport);
    tracing::debug!(
        kind = ?err.kind(),
        clears_cookies = err.clears_cookies(),
        "Authentication rejected"
    );
    err
}

/// Extractor for endpoints that require authentication.
/// Validates the access token; if it is missing or expired, attempts a
/// silent refresh. Rejects with a JSON 401.
pub struct Auth(pub ResolvedIdentity);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let transport = state.cookies();
        let Resolution { outcome, effect } =
            authenticate_request(parts, state, AuthMode::Mandatory);

        match outcome {
            Outcome::Authenticated(identity) => {
                defer_cookie_effect(transport, effect);
                Ok(Auth(identity))
            }
            Outcome::Rejected(kind) => Err(rejection(kind, effect, transport)),
            Outcome::Anonymous => Err(rejection(
                AuthErrorKind::NotAuthenticated,
                effect,
                transport,
            )),
        }
    }
}

/// Optional authentication extractor - never fails.
/// Cookie clearing and rotation still happen as for [`Auth`].
pub struct OptionalAuth(pub Option<ResolvedIdentity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Resolution { outcome, effect } =
            authenticate_request(parts, state, AuthMode::Optional);
        defer_cookie_effect(state.cookies(), effect);

        Ok(OptionalAuth(match outcome {
            Outcome::Authenticated(identity) => Some(identity),
            Outcome::Anonymous | Outcome::Rejected(_) => None,
        }))
    }
}
