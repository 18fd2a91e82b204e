//! Full session lifecycle: login, silent rotation, expiry.

mod common;

use axum::http::StatusCode;
use common::*;
use std::time::Duration;

#[tokio::test]
async fn test_login_rotate_then_expire() {
    let t = setup();
    let id = t.create_user("test@example.com", "qwe123!!", "Test User");

    // Login issues both cookies
    let response = t
        .send(json_request(
            "POST",
            "/auth/login",
            r#"{"email": "test@example.com", "password": "qwe123!!"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_set_cookies(&response);
    let access = set_cookie_value(&cookies, "access_token").unwrap();
    let refresh = set_cookie_value(&cookies, "refresh_token").unwrap();

    // Still inside the access lifetime: fast path, nothing rotated
    let response = t
        .send(get_with_cookies("/me", &auth_cookies(&access, &refresh)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_set_cookies(&response).is_empty());

    // Past the access lifetime: same user, access cookie rotated
    t.advance(ACCESS_LIFETIME);
    let response = t
        .send(get_with_cookies("/me", &auth_cookies(&access, &refresh)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_set_cookies(&response);
    let rotated = set_cookie_value(&cookies, "access_token").unwrap();
    assert_ne!(rotated, access);
    assert_eq!(body_json(response).await["id"], id.as_str());

    // Past the refresh lifetime too: rejected and both cookies cleared
    t.advance(REFRESH_LIFETIME - ACCESS_LIFETIME);
    let response = t
        .send(get_with_cookies("/me", &auth_cookies(&rotated, &refresh)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookies = extract_set_cookies(&response);
    assert!(has_cleared_cookie(&cookies, "access_token"));
    assert!(has_cleared_cookie(&cookies, "refresh_token"));
}

#[tokio::test]
async fn test_signup_session_is_usable() {
    let t = setup();

    let response = t
        .send(json_request(
            "POST",
            "/auth/signup",
            r#"{"email": "new@example.com", "password": "pw", "name": "Newcomer"}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookies = extract_set_cookies(&response);
    let access = set_cookie_value(&cookies, "access_token").unwrap();
    let refresh = set_cookie_value(&cookies, "refresh_token").unwrap();

    let response = t
        .send(get_with_cookies("/me", &auth_cookies(&access, &refresh)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Newcomer");
}

#[tokio::test]
async fn test_rotated_access_token_is_accepted_on_next_request() {
    let t = setup();
    t.create_user("test@example.com", "qwe123!!", "Test User");

    let response = t
        .send(json_request(
            "POST",
            "/auth/login",
            r#"{"email": "test@example.com", "password": "qwe123!!"}"#,
        ))
        .await;
    let cookies = extract_set_cookies(&response);
    let access = set_cookie_value(&cookies, "access_token").unwrap();
    let refresh = set_cookie_value(&cookies, "refresh_token").unwrap();

    t.advance(ACCESS_LIFETIME + Duration::from_secs(1));
    let response = t
        .send(get_with_cookies("/me", &auth_cookies(&access, &refresh)))
        .await;
    let rotated = set_cookie_value(&extract_set_cookies(&response), "access_token").unwrap();

    // The new access token is good on its own, without the refresh cookie
    let response = t
        .send(get_with_cookies("/me", &format!("access_token={}", rotated)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_set_cookies(&response).is_empty());
}
