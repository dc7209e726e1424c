// Public workflow submissions: membership renewals, foundation-class
// registrations, event signups. Validation runs before any database
// access so a bad payload is a cheap 400.
use axum::extract::Path;
use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::database::{DatabaseManager, Record, Repository};
use crate::error::ApiError;
use crate::format::{self, EntityKind};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::validation::{self, rules};

fn as_object(payload: Value) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::invalid_json("Expected JSON object")),
    }
}

/// POST /api/membership/renew
pub async fn membership_renew(Json(payload): Json<Value>) -> ApiResult<Value> {
    let candidate = as_object(payload)?;

    let report = rules::validate_membership_renewal(&candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let mut record = Record::from_json(Value::Object(candidate))?;
    record.retain_fields(&validation::field_names(rules::membership_renewal_rules()));
    record.set("kind", json!(EntityKind::MembershipRenewal.as_str()));
    record.set("renewal_date", json!(Utc::now().to_rfc3339()));
    record.set_system_field("status", json!("pending"));

    let pool = DatabaseManager::main_pool().await?;
    let saved = Repository::new("membership_renewals")?.insert(&pool, record.into_fields()).await?;

    Ok(ApiResponse::created_with_message(
        "Membership renewal submitted",
        format::format_record(&saved),
    ))
}

/// POST /api/foundation-classes/register
pub async fn foundation_class_register(Json(payload): Json<Value>) -> ApiResult<Value> {
    let candidate = as_object(payload)?;

    let report = rules::validate_foundation_class_registration(&candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let mut record = Record::from_json(Value::Object(candidate))?;
    record.retain_fields(&validation::field_names(rules::foundation_class_rules()));
    record.set("kind", json!(EntityKind::FoundationClass.as_str()));
    record.set("registration_date", json!(Utc::now().to_rfc3339()));
    record.set_system_field("status", json!("registered"));

    let pool = DatabaseManager::main_pool().await?;
    let saved = Repository::new("foundation_class_registrations")?
        .insert(&pool, record.into_fields())
        .await?;

    Ok(ApiResponse::created_with_message(
        "Foundation class registration received",
        format::format_record(&saved),
    ))
}

/// POST /api/events/:id/signup
pub async fn event_signup(
    Path(event_id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let candidate = as_object(payload)?;

    let report = rules::validate_event_signup(&candidate);
    if !report.is_valid {
        return Err(report.into());
    }

    let mut record = Record::from_json(Value::Object(candidate))?;
    record.retain_fields(&validation::field_names(rules::event_signup_rules()));
    record.set("kind", json!(EntityKind::EventSignup.as_str()));
    record.set("event_id", json!(event_id));
    record.set_system_field("status", json!("pending"));

    let pool = DatabaseManager::main_pool().await?;

    // the signup must point at a real event
    Repository::new("events")?
        .fetch_by_id(&pool, &event_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Event {} not found", event_id)))?;

    let saved = Repository::new("event_signups")?.insert(&pool, record.into_fields()).await?;

    Ok(ApiResponse::created_with_message(
        "Event signup received",
        format::format_record(&saved),
    ))
}
