mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, json_request};

#[tokio::test]
async fn test_register_returns_user() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register/",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": "password123",
                "password2": "password123",
                "first_name": "Jane"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["username"], "jane");
    assert_eq!(body["user"]["first_name"], "Jane");
    assert_eq!(body["user"]["last_name"], "");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register/",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": "password123",
                "password2": "password321"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_short_password() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register/",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": "short",
                "password2": "short"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "jane@example.com").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register/",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": "password123",
                "password2": "password123"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_login_and_me() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "lifter@example.com").await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login/",
            None,
            Some(json!({ "email": "lifter@example.com", "password": common::PASSWORD })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let access = tokens["access"].as_str().unwrap().to_string();
    assert!(tokens["refresh"].is_string());

    let response = app
        .oneshot(json_request("GET", "/api/auth/me/", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], user.id);
    assert_eq!(me["email"], "lifter@example.com");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "lifter@example.com").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login/",
            None,
            Some(json!({ "email": "lifter@example.com", "password": "wrongpassword" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let missing = app
        .clone()
        .oneshot(json_request("GET", "/api/auth/me/", None, None))
        .await
        .unwrap();
    let bogus = app
        .oneshot(json_request("GET", "/api/auth/me/", Some("not-a-token"), None))
        .await
        .unwrap();

    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let pool = common::setup_test_db();
    let (_, access) = common::create_logged_in_user(&pool, "lifter@example.com").await;
    let app = common::create_test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout/", Some(&access), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("GET", "/api/auth/me/", Some(&access), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "lifter@example.com").await;
    let app = common::create_test_app(pool);

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login/",
            None,
            Some(json!({ "email": "lifter@example.com", "password": common::PASSWORD })),
        ))
        .await
        .unwrap();
    let tokens = body_json(login).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh/",
            None,
            Some(json!({ "refresh": tokens["refresh"] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_eq!(refreshed["refresh"], tokens["refresh"]);
    assert_ne!(refreshed["access"], tokens["access"]);

    let response = app
        .oneshot(json_request(
            "GET",
            "/api/auth/me/",
            Some(refreshed["access"].as_str().unwrap()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh/",
            None,
            Some(json!({ "refresh": "nope" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(json_request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert!(body["git_version"].is_string());
}
