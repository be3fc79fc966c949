//! Integration tests for the `/auth` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_auth, post_json, post_json_auth};
use serde_json::json;

const SIGNUP: &str = "/api/v1/auth/signup";
const SIGNIN: &str = "/api/v1/auth/signin";
const REFRESH: &str = "/api/v1/auth/refresh";

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_signup_returns_201_with_tokens_and_user() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        SIGNUP,
        json!({ "email": " Ada@Example.com", "password": "password-123", "display_name": "Ada" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["expires_in"].as_i64().unwrap() > 0);
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["display_name"], "Ada");
}

#[tokio::test]
async fn test_duplicate_signup_is_a_conflict() {
    let app = common::build_test_app();
    common::sign_up(app.clone(), "dup@example.com").await;

    let response = post_json(
        app,
        SIGNUP,
        json!({ "email": "DUP@example.com", "password": "password-123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_rejects_short_password_and_bad_email() {
    let app = common::build_test_app();

    let response = post_json(
        app.clone(),
        SIGNUP,
        json!({ "email": "short@example.com", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        app,
        SIGNUP,
        json!({ "email": "not-an-email", "password": "password-123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_signin_with_wrong_password_is_invalid_credentials() {
    let app = common::build_test_app();
    common::sign_up(app.clone(), "user@example.com").await;

    let response = post_json(
        app.clone(),
        SIGNIN,
        json!({ "email": "user@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_CREDENTIALS");

    // Unknown accounts get the same answer.
    let response = post_json(
        app,
        SIGNIN,
        json!({ "email": "nobody@example.com", "password": "password-123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], json["error"]);
}

#[tokio::test]
async fn test_signin_succeeds_with_correct_password() {
    let app = common::build_test_app();
    let (_, user_id) = common::sign_up(app.clone(), "user@example.com").await;

    let response = post_json(
        app,
        SIGNIN,
        json!({ "email": "user@example.com", "password": "password-123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["id"], user_id);
}

// ---------------------------------------------------------------------------
// Refresh and sign-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_refresh_rotates_the_refresh_token() {
    let app = common::build_test_app();
    let response = post_json(
        app.clone(),
        SIGNUP,
        json!({ "email": "rot@example.com", "password": "password-123" }),
    )
    .await;
    let first = body_json(response).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(app.clone(), REFRESH, json!({ "refresh_token": first })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_ne!(second["refresh_token"], first.as_str());

    // The consumed token cannot be replayed.
    let response = post_json(app, REFRESH, json!({ "refresh_token": first })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_signout_revokes_refresh_tokens() {
    let app = common::build_test_app();
    let response = post_json(
        app.clone(),
        SIGNUP,
        json!({ "email": "out@example.com", "password": "password-123" }),
    )
    .await;
    let json = body_json(response).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_auth(app.clone(), "/api/v1/auth/signout", &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(app, REFRESH, json!({ "refresh_token": refresh })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signout_invalidates_the_access_token() {
    let app = common::build_test_app();
    let (token, _) = common::sign_up(app.clone(), "gone@example.com").await;

    let response = post_auth(app.clone(), "/api/v1/auth/signout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        json!({ "name": "after-signout" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app.clone(), "/api/v1/projects", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Signing in again opens a fresh, working session.
    let response = post_json(
        app.clone(),
        SIGNIN,
        json!({ "email": "gone@example.com", "password": "password-123" }),
    )
    .await;
    let fresh = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    let response = get_auth(app, "/api/v1/projects", &fresh).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Session inspection and bearer enforcement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_session_describes_the_bearer() {
    let app = common::build_test_app();
    let (token, user_id) = common::sign_up(app.clone(), "me@example.com").await;

    let response = get_auth(app, "/api/v1/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user_id);
    assert_eq!(json["user"]["email"], "me@example.com");
    assert!(json["refresh_token"].is_null());
}

#[tokio::test]
async fn test_protected_endpoints_require_a_valid_token() {
    let app = common::build_test_app();

    let response = get(app.clone(), "/api/v1/auth/session").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = get_auth(app.clone(), "/api/v1/projects", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(app, "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
