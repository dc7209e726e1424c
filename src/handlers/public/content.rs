// Public content reads. Every payload passes through the response
// formatter so the frontend always sees `id`, `kind`, resolved image
// URLs, and display-safe dates.
use axum::extract::Path;
use serde_json::Value;

use crate::database::{DatabaseManager, Repository};
use crate::error::ApiError;
use crate::format;
use crate::middleware::response::{ApiResponse, ApiResult};

async fn list_collection(table: &'static str) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let records = Repository::new(table)?.fetch_all(&pool).await?;
    Ok(ApiResponse::success(Value::Array(format::format_records(&records))))
}

async fn get_record(table: &'static str, id: &str) -> ApiResult<Value> {
    let pool = DatabaseManager::main_pool().await?;
    let record = Repository::new(table)?
        .fetch_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Record {} not found", id)))?;
    Ok(ApiResponse::success(format::format_record(&record)))
}

/// GET /api/sermons
pub async fn sermons_list() -> ApiResult<Value> {
    list_collection("sermons").await
}

/// GET /api/sermons/:id
pub async fn sermons_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("sermons", &id).await
}

/// GET /api/events
pub async fn events_list() -> ApiResult<Value> {
    list_collection("events").await
}

/// GET /api/events/:id
pub async fn events_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("events", &id).await
}

/// GET /api/leaders
pub async fn leaders_list() -> ApiResult<Value> {
    list_collection("leaders").await
}

/// GET /api/leaders/:id
pub async fn leaders_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("leaders", &id).await
}

/// GET /api/cell-groups
pub async fn cell_groups_list() -> ApiResult<Value> {
    list_collection("cell_groups").await
}

/// GET /api/cell-groups/:id
pub async fn cell_groups_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("cell_groups", &id).await
}

/// GET /api/zones
pub async fn zones_list() -> ApiResult<Value> {
    list_collection("zones").await
}

/// GET /api/zones/:id
pub async fn zones_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("zones", &id).await
}

/// GET /api/media
pub async fn media_list() -> ApiResult<Value> {
    list_collection("media").await
}

/// GET /api/media/:id
pub async fn media_get(Path(id): Path<String>) -> ApiResult<Value> {
    get_record("media", &id).await
}
