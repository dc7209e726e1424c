// Admin content management. Create and update validate against the
// entity's rule table; payload keys outside the rules and the entity's
// image fields are dropped before they can reach the SQL layer.
use axum::extract::Path;
use axum::response::Json;
use serde_json::{json, Map, Value};

use crate::database::{DatabaseManager, Record, Repository};
use crate::error::ApiError;
use crate::format::{self, profile_for, EntityKind};
use crate::middleware::auth::AdminUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::validation::{self, rules};

fn as_object(payload: Value) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::invalid_json("Expected JSON object")),
    }
}

fn allowed_fields(kind: EntityKind) -> Vec<&'static str> {
    let mut fields = validation::field_names(rules::content_rules(kind));
    fields.extend_from_slice(profile_for(kind).image_fields);
    fields
}

async fn create_content(kind: EntityKind, table: &'static str, payload: Value) -> ApiResult<Value> {
    let candidate = as_object(payload)?;

    let report = validation::validate_record(rules::content_rules(kind), &candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let mut record = Record::from_json(Value::Object(candidate))?;
    record.retain_fields(&allowed_fields(kind));
    record.set("kind", json!(kind.as_str()));

    let pool = DatabaseManager::main_pool().await?;
    let saved = Repository::new(table)?.insert(&pool, record.into_fields()).await?;

    Ok(ApiResponse::created(format::format_record(&saved)))
}

async fn update_content(
    kind: EntityKind,
    table: &'static str,
    id: &str,
    payload: Value,
) -> ApiResult<Value> {
    let candidate = as_object(payload)?;

    let report = validation::validate_record(rules::content_rules(kind), &candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let mut record = Record::from_json(Value::Object(candidate))?;
    record.retain_fields(&allowed_fields(kind));

    let pool = DatabaseManager::main_pool().await?;
    let updated = Repository::new(table)?
        .update_fields(&pool, id, record.into_fields())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Record {} not found", id)))?;

    Ok(ApiResponse::success(format::format_record(&updated)))
}

async fn delete_content(table: &'static str, id: &str) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let removed = Repository::new(table)?.delete(&pool, id).await?;
    if !removed {
        return Err(ApiError::not_found(format!("Record {} not found", id)));
    }
    Ok(ApiResponse::with_message("Record deleted", json!({ "id": id })))
}

/// POST /api/sermons
pub async fn sermon_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::Sermon, "sermons", payload).await
}

/// PUT /api/sermons/:id
pub async fn sermon_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::Sermon, "sermons", &id, payload).await
}

/// DELETE /api/sermons/:id
pub async fn sermon_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("sermons", &id).await
}

/// POST /api/events
pub async fn event_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::Event, "events", payload).await
}

/// PUT /api/events/:id
pub async fn event_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::Event, "events", &id, payload).await
}

/// DELETE /api/events/:id
pub async fn event_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("events", &id).await
}

/// POST /api/leaders
pub async fn leader_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::Leader, "leaders", payload).await
}

/// PUT /api/leaders/:id
pub async fn leader_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::Leader, "leaders", &id, payload).await
}

/// DELETE /api/leaders/:id
pub async fn leader_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("leaders", &id).await
}

/// POST /api/cell-groups
pub async fn cell_group_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::CellGroup, "cell_groups", payload).await
}

/// PUT /api/cell-groups/:id
pub async fn cell_group_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::CellGroup, "cell_groups", &id, payload).await
}

/// DELETE /api/cell-groups/:id
pub async fn cell_group_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("cell_groups", &id).await
}

/// POST /api/zones
pub async fn zone_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::Zone, "zones", payload).await
}

/// PUT /api/zones/:id
pub async fn zone_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::Zone, "zones", &id, payload).await
}

/// DELETE /api/zones/:id
pub async fn zone_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("zones", &id).await
}

/// POST /api/media
pub async fn media_create(_admin: AdminUser, Json(payload): Json<Value>) -> ApiResult<Value> {
    create_content(EntityKind::Media, "media", payload).await
}

/// PUT /api/media/:id
pub async fn media_update(
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    update_content(EntityKind::Media, "media", &id, payload).await
}

/// DELETE /api/media/:id
pub async fn media_delete(_admin: AdminUser, Path(id): Path<String>) -> ApiResult<Value> {
    delete_content("media", &id).await
}
