//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::{CookieTransport, append_set_cookies};

/// Why authentication did not produce an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    NotAuthenticated,
    InvalidToken,
    NoRefreshToken,
    InvalidRefreshToken,
    UserNotFound,
    TokenIssue,
}

impl AuthErrorKind {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthErrorKind::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::NotAuthenticated => "No token",
            AuthErrorKind::InvalidToken => "Invalid token",
            AuthErrorKind::NoRefreshToken => "No refresh token",
            AuthErrorKind::InvalidRefreshToken => "Invalid refresh token",
            AuthErrorKind::UserNotFound => "User not found for refresh token",
            AuthErrorKind::TokenIssue => "Failed to issue token",
        }
    }
}

/// Rejection from the mandatory extractor. Clears both cookies when the
/// refresh path failed.
#[derive(Debug)]
pub struct ApiAuthError {
    kind: AuthErrorKind,
    clear_cookies: bool,
    transport: CookieTransport,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind, clear_cookies: bool, transport: CookieTransport) -> Self {
        Self {
            kind,
            clear_cookies,
            transport,
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    pub fn clears_cookies(&self) -> bool {
        self.clear_cookies
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: &'static str,
        }

        let mut response = (
            self.kind.status_code(),
            Json(ErrorResponse {
                message: self.kind.message(),
            }),
        )
            .into_response();

        if self.clear_cookies {
            append_set_cookies(response.headers_mut(), self.transport.clear_both());
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_rejection_without_clearing() {
        let response =
            ApiAuthError::new(AuthErrorKind::NotAuthenticated, false, CookieTransport::new(false))
                .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_rejection_clears_both_cookies() {
        let err = ApiAuthError::new(AuthErrorKind::UserNotFound, true, CookieTransport::new(false));
        assert_eq!(err.kind(), AuthErrorKind::UserNotFound);
        assert!(err.clears_cookies());

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn test_token_issue_is_server_error() {
        let response =
            ApiAuthError::new(AuthErrorKind::TokenIssue, false, CookieTransport::new(false))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
