//! Authentication user types.

use crate::jwt::SignedToken;

/// Identity resolved for the current request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: String,
}

/// How a missing identity is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Reject the request without an identity.
    Mandatory,
    /// Continue anonymously without an identity.
    Optional,
}

/// Cookie change the response must carry, decided while authenticating.
#[derive(Debug, Clone)]
pub enum CookieEffect {
    None,
    /// Replace the access cookie; the refresh cookie is left alone.
    RotateAccess(SignedToken),
    ClearBoth,
}

impl CookieEffect {
    pub fn clears(&self) -> bool {
        matches!(self, CookieEffect::ClearBoth)
    }
}
