// Admin workflow management: list, status changes, deletes. Status
// changes validate the enum before touching the database and fire a
// notification afterwards; notification failure never fails the request.
use axum::extract::Path;
use axum::response::Json;
use serde_json::{json, Map, Value};

use crate::database::{DatabaseManager, Repository};
use crate::error::ApiError;
use crate::format;
use crate::middleware::auth::AdminUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::notify::{self, Notification};
use crate::validation::{rules, ValidationReport};

async fn list_table(table: &'static str) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let records = Repository::new(table)?.fetch_all(&pool).await?;
    Ok(ApiResponse::success(Value::Array(format::format_records(&records))))
}

fn extract_status(payload: &Value) -> &str {
    payload.get("status").and_then(|v| v.as_str()).unwrap_or("")
}

async fn update_status(
    table: &'static str,
    label: &str,
    id: &str,
    status: &str,
    report: ValidationReport,
) -> ApiResult<Value> {
    if !report.is_valid {
        return Err(report.into());
    }

    let pool = DatabaseManager::main_pool().await?;
    let mut changes = Map::new();
    changes.insert("status".to_string(), json!(status));

    let updated = Repository::new(table)?
        .update_fields(&pool, id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", label, id)))?;

    // Delivery failure is logged inside dispatch and deliberately ignored
    let recipient = updated.get("email").and_then(|v| v.as_str()).map(str::to_string);
    notify::dispatch(&Notification::status_change(label, id, status, recipient)).await;

    Ok(ApiResponse::with_message(
        format!("{} status updated to {}", label, status),
        format::format_record(&updated),
    ))
}

async fn delete_row(table: &'static str, label: &str, id: &str) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let removed = Repository::new(table)?.delete(&pool, id).await?;
    if !removed {
        return Err(ApiError::not_found(format!("{} {} not found", label, id)));
    }
    Ok(ApiResponse::with_message(format!("{} deleted", label), json!({ "id": id })))
}

/// GET /api/membership/renewals
pub async fn renewals_list(_admin: AdminUser) -> ApiResult<Value> {
    list_table("membership_renewals").await
}

/// PUT /api/membership/renewals/:id
pub async fn renewal_status_put(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let status = extract_status(&payload);
    let report = rules::validate_membership_status(status);
    update_status("membership_renewals", "Membership renewal", &id, status, report).await
}

/// DELETE /api/membership/renewals/:id
pub async fn renewal_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_row("membership_renewals", "Membership renewal", &id).await
}

/// GET /api/foundation-classes/registrations
pub async fn registrations_list(_admin: AdminUser) -> ApiResult<Value> {
    list_table("foundation_class_registrations").await
}

/// PUT /api/foundation-classes/registrations/:id
pub async fn registration_status_put(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let status = extract_status(&payload);
    let report = rules::validate_foundation_class_status(status);
    update_status(
        "foundation_class_registrations",
        "Foundation class registration",
        &id,
        status,
        report,
    )
    .await
}

/// DELETE /api/foundation-classes/registrations/:id
pub async fn registration_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_row("foundation_class_registrations", "Foundation class registration", &id).await
}

/// GET /api/event-signups
pub async fn signups_list(_admin: AdminUser) -> ApiResult<Value> {
    list_table("event_signups").await
}

/// PUT /api/event-signups/:id
pub async fn signup_status_put(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let status = extract_status(&payload);
    let report = rules::validate_event_signup_status(status);
    update_status("event_signups", "Event signup", &id, status, report).await
}

/// DELETE /api/event-signups/:id
pub async fn signup_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_row("event_signups", "Event signup", &id).await
}
