mod common;

use axum::http::StatusCode;
use serde_json::json;

// Workflow submission and status-change validation. Every request here
// fails validation, which the handlers run before touching the database.

#[tokio::test]
async fn renewal_submission_reports_missing_fields() {
    let (status, body) = common::request(
        "POST",
        "/api/membership/renew",
        None,
        Some(json!({"full_name": "John Doe"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["email", "phone", "birthday", "member_since", "agree_to_terms"] {
        assert!(body["field_errors"][field].is_string(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn renewal_address_change_requires_new_address() {
    let (status, body) = common::request(
        "POST",
        "/api/membership/renew",
        None,
        Some(json!({
            "full_name": "John Doe",
            "email": "john@example.com",
            "phone": "1234567890",
            "birthday": "1990-01-01",
            "member_since": "2020",
            "agree_to_terms": true,
            "address_change": true,
            "new_address": ""
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["new_address"], "New address is required");
}

#[tokio::test]
async fn renewal_rejects_non_object_payload() {
    let (status, body) =
        common::request("POST", "/api/membership/renew", None, Some(json!("hello"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn foundation_class_registration_requires_session() {
    let (status, body) = common::request(
        "POST",
        "/api/foundation-classes/register",
        None,
        Some(json!({
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-123-4567"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["preferred_session"], "Preferred session is required");
}

#[tokio::test]
async fn signup_rejects_unknown_event_type() {
    let (status, body) = common::request(
        "POST",
        "/api/events/some-event/signup",
        None,
        Some(json!({
            "event_type": "wedding",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "5551234567"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["event_type"]
        .as_str()
        .expect("event_type error")
        .contains("must be one of"));
}

#[tokio::test]
async fn baby_dedication_signup_requires_child_fields() {
    let (status, body) = common::request(
        "POST",
        "/api/events/some-event/signup",
        None,
        Some(json!({
            "event_type": "baby_dedication",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "5551234567"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["child_name", "child_date_of_birth", "parent_names"] {
        assert!(body["field_errors"][field].is_string(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn status_changes_require_authentication() {
    let (status, _) = common::request(
        "PUT",
        "/api/membership/renewals/some-id",
        None,
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        common::request("DELETE", "/api/event-signups/some-id", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn status_enum_is_enforced_per_workflow() {
    // membership statuses don't include "attending"
    let (status, body) = common::request(
        "PUT",
        "/api/membership/renewals/some-id",
        Some(common::DEV_TOKEN),
        Some(json!({"status": "attending"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["status"].is_string());

    // missing status counts as required, not as enum failure
    let (status, body) = common::request(
        "PUT",
        "/api/event-signups/some-id",
        Some(common::DEV_TOKEN),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["status"], "Status is required");
}
