mod common;

use axum::http::StatusCode;
use serde_json::json;

// These tests run against the Development configuration: the dev login
// and dev bearer shortcut are on, and the JWT secret has a default.

#[tokio::test]
async fn root_lists_endpoints() {
    let (status, body) = common::request("GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"].is_object());
}

#[tokio::test]
async fn admin_routes_require_bearer() {
    let (status, body) = common::request("GET", "/api/membership/renewals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_bearer_is_rejected() {
    let (status, _) =
        common::request("GET", "/api/event-signups", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::request("GET", "/api/event-signups", Some(""), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_requires_username_and_password() {
    let (status, body) = common::request("POST", "/api/auth/login", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["username"].is_string());
    assert!(body["field_errors"]["password"].is_string());
}

#[tokio::test]
async fn dev_login_issues_a_working_token() {
    let (status, body) = common::request(
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let token = body["data"]["token"].as_str().expect("token");
    assert!(!token.is_empty());
    assert_eq!(body["data"]["expires_in"], 24 * 3600);
    assert_eq!(body["data"]["user"]["username"], "admin");

    // The issued token clears authentication: an invalid status payload
    // now fails validation (400), not auth (401).
    let (status, body) = common::request(
        "PUT",
        "/api/membership/renewals/some-id",
        Some(token),
        Some(json!({"status": "graduated"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn dev_token_shortcut_is_honored_in_development() {
    let (status, body) = common::request(
        "PUT",
        "/api/foundation-classes/registrations/some-id",
        Some(common::DEV_TOKEN),
        Some(json!({"status": "graduated"})),
    )
    .await;
    // auth passed; the enum check rejected the payload before any
    // database access
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["status"]
        .as_str()
        .expect("status error")
        .contains("must be one of"));
}
