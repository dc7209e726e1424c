use axum::response::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AdminUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::notify::{self, Notification};
use crate::validation::{rules, validate_record};

/// POST /api/notifications - send an ad hoc admin notification.
/// Delivery failure does not fail the request; the response reports it.
pub async fn send(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    let candidate = payload
        .as_object()
        .cloned()
        .ok_or_else(|| ApiError::invalid_json("Expected JSON object"))?;

    let report = validate_record(rules::notification_rules(), &candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let recipient = candidate.get("recipient").and_then(|v| v.as_str()).unwrap_or("");
    let subject = candidate.get("subject").and_then(|v| v.as_str()).unwrap_or("");
    let message = candidate.get("message").and_then(|v| v.as_str()).unwrap_or("");

    let delivered = notify::dispatch(&Notification::message(recipient, subject, message)).await;

    Ok(ApiResponse::with_message(
        if delivered { "Notification sent" } else { "Notification accepted, delivery failed" },
        json!({ "delivered": delivered }),
    ))
}
