use axum::response::Json;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::config;
use crate::database::{DatabaseManager, Repository};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

/// POST /api/auth/login - authenticate an admin and receive a JWT
pub async fn login(Json(payload): Json<Value>) -> ApiResult<Value> {
    let username = payload.get("username").and_then(|v| v.as_str()).unwrap_or("").trim();
    let password = payload.get("password").and_then(|v| v.as_str()).unwrap_or("");

    let mut field_errors = HashMap::new();
    if username.is_empty() {
        field_errors.insert("username".to_string(), "Username is required".to_string());
    }
    if password.is_empty() {
        field_errors.insert("password".to_string(), "Password is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(field_errors)));
    }

    // Development-only shortcut, structurally unreachable in production:
    // allow_dev_login is false outside Development defaults and has no
    // env override.
    if config::config().security.allow_dev_login && username == "admin" && password == "admin" {
        return issue_token(username, "admin", Uuid::nil());
    }

    let pool = DatabaseManager::main_pool().await?;
    let users = Repository::new("admin_users")?.fetch_where(&pool, "username", username).await?;

    let user = users
        .first()
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let stored = user.get("password_digest").and_then(|v| v.as_str()).unwrap_or("");
    if stored.is_empty() || auth::password_digest(username, password) != stored {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let role = user.get("role").and_then(|v| v.as_str()).unwrap_or("admin").to_string();
    let user_id = user
        .id()
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(Uuid::nil);

    issue_token(username, &role, user_id)
}

fn issue_token(username: &str, role: &str, user_id: Uuid) -> ApiResult<Value> {
    let claims = Claims::new(username.to_string(), role.to_string(), user_id);
    let token = auth::generate_jwt(claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user_id,
            "username": username,
            "role": role,
        },
        "expires_in": expires_in,
    })))
}
