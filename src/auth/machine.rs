//! Credential resolution run once per request.
//!
//! 1. No cookies: reject (mandatory) or continue anonymously (optional).
//! 2. Access token valid: identity from the token, no user lookup.
//!    Invalid: mandatory rejects, optional tries the refresh token.
//!    Expired: try the refresh token.
//! 3. No refresh token: reject or continue anonymously.
//! 4. Refresh token invalid/expired or its user is gone: clear both cookies,
//!    then reject or continue anonymously. Otherwise issue a new access token.

use tracing::{debug, error, info};

use super::cookie::Credentials;
use super::errors::AuthErrorKind;
use super::types::{AuthMode, CookieEffect, ResolvedIdentity};
use crate::db::UserRepository;
use crate::jwt::{TokenCodec, TokenDomain, VerifyError};

/// Result of resolving one request's credentials.
#[derive(Debug)]
pub enum Outcome {
    Authenticated(ResolvedIdentity),
    /// Optional mode only.
    Anonymous,
    /// Mandatory mode only.
    Rejected(AuthErrorKind),
}

#[derive(Debug)]
pub struct Resolution {
    pub outcome: Outcome,
    pub effect: CookieEffect,
}

impl Resolution {
    fn authenticated(user_id: String, effect: CookieEffect) -> Self {
        Self {
            outcome: Outcome::Authenticated(ResolvedIdentity { user_id }),
            effect,
        }
    }

    fn unresolved(mode: AuthMode, kind: AuthErrorKind, effect: CookieEffect) -> Self {
        debug!(?mode, ?kind, clear_cookies = effect.clears(), "No identity resolved");
        let outcome = match mode {
            AuthMode::Mandatory => Outcome::Rejected(kind),
            AuthMode::Optional => Outcome::Anonymous,
        };
        Self { outcome, effect }
    }
}

/// Decide the identity and cookie side effect for a request.
pub fn resolve(
    mode: AuthMode,
    credentials: Credentials<'_>,
    codec: &TokenCodec,
    users: &dyn UserRepository,
) -> Resolution {
    if credentials.is_empty() {
        return Resolution::unresolved(mode, AuthErrorKind::NotAuthenticated, CookieEffect::None);
    }

    if let Some(access_token) = credentials.access {
        match codec.verify(TokenDomain::Access, access_token) {
            Ok(user_id) => return Resolution::authenticated(user_id, CookieEffect::None),
            Err(VerifyError::Invalid) if mode == AuthMode::Mandatory => {
                return Resolution::unresolved(
                    mode,
                    AuthErrorKind::InvalidToken,
                    CookieEffect::None,
                );
            }
            Err(e) => debug!(reason = %e, "Access token unusable, trying refresh token"),
        }
    }

    let Some(refresh_token) = credentials.refresh else {
        return Resolution::unresolved(mode, AuthErrorKind::NoRefreshToken, CookieEffect::None);
    };

    let user_id = match codec.verify(TokenDomain::Refresh, refresh_token) {
        Ok(user_id) => user_id,
        Err(e) => {
            debug!(reason = %e, "Refresh token rejected");
            return Resolution::unresolved(
                mode,
                AuthErrorKind::InvalidRefreshToken,
                CookieEffect::ClearBoth,
            );
        }
    };

    if users.find_by_id(&user_id).is_none() {
        info!(user_id = %user_id, "Refresh token subject no longer exists");
        return Resolution::unresolved(mode, AuthErrorKind::UserNotFound, CookieEffect::ClearBoth);
    }

    match codec.issue(TokenDomain::Access, &user_id) {
        Ok(token) => {
            debug!(user_id = %user_id, "Access token rotated");
            Resolution::authenticated(user_id, CookieEffect::RotateAccess(token))
        }
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            Resolution::unresolved(mode, AuthErrorKind::TokenIssue, CookieEffect::None)
        }
    }
}
