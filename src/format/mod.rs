// Response formatting: converts raw database rows into the JSON shape the
// frontend renders. Every record leaves here with a string `id`, a `kind`
// tag, resolved image URLs, and display-safe date fields.
pub mod dates;

use serde_json::{Map, Value};

use crate::config;
use crate::database::record::Record;
use dates::{format_date, format_time_12h, parse_datetime, process_date_field, DATE_UNAVAILABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sermon,
    Event,
    Leader,
    CellGroup,
    Zone,
    Media,
    MembershipRenewal,
    FoundationClass,
    EventSignup,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Sermon => "sermon",
            EntityKind::Event => "event",
            EntityKind::Leader => "leader",
            EntityKind::CellGroup => "cell_group",
            EntityKind::Zone => "zone",
            EntityKind::Media => "media",
            EntityKind::MembershipRenewal => "membership_renewal",
            EntityKind::FoundationClass => "foundation_class",
            EntityKind::EventSignup => "event_signup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sermon" => Some(EntityKind::Sermon),
            "event" => Some(EntityKind::Event),
            "leader" => Some(EntityKind::Leader),
            "cell_group" | "cell-group" => Some(EntityKind::CellGroup),
            "zone" => Some(EntityKind::Zone),
            "media" => Some(EntityKind::Media),
            "membership_renewal" => Some(EntityKind::MembershipRenewal),
            "foundation_class" => Some(EntityKind::FoundationClass),
            "event_signup" => Some(EntityKind::EventSignup),
            _ => None,
        }
    }
}

/// Per-kind formatting strategy: which fields are display dates, which are
/// image references, and where the default asset lives.
pub struct EntityProfile {
    pub kind: EntityKind,
    pub date_fields: &'static [&'static str],
    pub image_fields: &'static [&'static str],
    pub default_asset: &'static str,
}

const PROFILES: &[EntityProfile] = &[
    EntityProfile {
        kind: EntityKind::Sermon,
        date_fields: &["date"],
        image_fields: &["image"],
        default_asset: "sermons/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::Event,
        date_fields: &["date"],
        image_fields: &["image", "cover_image"],
        default_asset: "events/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::Leader,
        date_fields: &[],
        image_fields: &["image", "leader_image"],
        default_asset: "leaders/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::CellGroup,
        date_fields: &[],
        image_fields: &["image"],
        default_asset: "cell-groups/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::Zone,
        date_fields: &[],
        image_fields: &["image"],
        default_asset: "zones/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::Media,
        date_fields: &["published_date"],
        image_fields: &["image", "cover_image"],
        default_asset: "media/default.jpg",
    },
    EntityProfile {
        kind: EntityKind::MembershipRenewal,
        date_fields: &["birthday", "renewal_date"],
        image_fields: &[],
        default_asset: "",
    },
    EntityProfile {
        kind: EntityKind::FoundationClass,
        date_fields: &["registration_date"],
        image_fields: &[],
        default_asset: "",
    },
    EntityProfile {
        kind: EntityKind::EventSignup,
        date_fields: &["child_date_of_birth"],
        image_fields: &[],
        default_asset: "",
    },
];

const FALLBACK_PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Media,
    date_fields: &[],
    image_fields: &[],
    default_asset: "",
};

/// Fields that are never recursed into as nested objects. A date field
/// holding an object is corruption, not structure.
const DATE_FIELD_NAMES: &[&str] = &[
    "date",
    "time",
    "start_date",
    "end_date",
    "birthday",
    "renewal_date",
    "registration_date",
    "published_date",
    "child_date_of_birth",
    "created_at",
    "updated_at",
];

pub fn profile_for(kind: EntityKind) -> &'static EntityProfile {
    PROFILES.iter().find(|p| p.kind == kind).unwrap_or(&FALLBACK_PROFILE)
}

/// Best-effort kind inference from field shape, for legacy rows written
/// before `kind` was stored. Order-dependent; first match wins.
pub fn infer_kind(map: &Map<String, Value>) -> Option<EntityKind> {
    let has = |key: &str| map.get(key).map(|v| !v.is_null()).unwrap_or(false);

    if has("member_since") || has("agree_to_terms") {
        return Some(EntityKind::MembershipRenewal);
    }
    if has("preferred_session") {
        return Some(EntityKind::FoundationClass);
    }
    if has("event_type") {
        return Some(EntityKind::EventSignup);
    }
    if has("start_date") && has("title") {
        return Some(EntityKind::Event);
    }
    if has("speaker") && has("title") {
        return Some(EntityKind::Sermon);
    }
    if has("url") && has("title") {
        return Some(EntityKind::Media);
    }
    if has("zone_id") && has("name") {
        return Some(EntityKind::CellGroup);
    }
    if has("role") && has("name") {
        return Some(EntityKind::Leader);
    }
    if has("name") {
        return Some(EntityKind::Zone);
    }
    None
}

/// Format a single record or an array of records with no original-row
/// backing (e.g. values that already left the database layer).
pub fn format_response(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(format_map(map, None)),
                    other => other,
                })
                .collect(),
        ),
        Value::Object(map) => Value::Object(format_map(map, None)),
        other => other,
    }
}

/// Format a database record, keeping its original row available for
/// corrupted-date recovery.
pub fn format_record(record: &Record) -> Value {
    Value::Object(format_map(record.fields().clone(), record.original()))
}

pub fn format_records(records: &[Record]) -> Vec<Value> {
    records.iter().map(format_record).collect()
}

fn format_map(mut map: Map<String, Value>, original: Option<&Map<String, Value>>) -> Map<String, Value> {
    normalize_id(&mut map);

    let kind = map
        .get("kind")
        .and_then(|v| v.as_str())
        .and_then(EntityKind::parse)
        .or_else(|| map.get("type").and_then(|v| v.as_str()).and_then(EntityKind::parse))
        .or_else(|| infer_kind(&map));

    if let Some(kind) = kind {
        map.insert("kind".to_string(), Value::String(kind.as_str().to_string()));

        let profile = profile_for(kind);

        for field in profile.date_fields {
            let present = map.contains_key(*field)
                || original.map(|o| o.contains_key(*field)).unwrap_or(false);
            if present {
                let display = process_date_field(&map, original, field);
                map.insert((*field).to_string(), Value::String(display));
            }
        }

        if kind == EntityKind::Event {
            derive_event_display(&mut map, original);
        }

        for field in profile.image_fields {
            resolve_image(&mut map, field, profile);
        }
    }

    // Recurse into nested structures; date fields are excluded so a
    // corrupted date object is never treated as a nested record.
    let keys: Vec<String> = map.keys().cloned().collect();
    for key in keys {
        if DATE_FIELD_NAMES.contains(&key.as_str()) {
            continue;
        }
        match map.get(&key).cloned() {
            Some(Value::Object(inner)) => {
                map.insert(key, Value::Object(format_map(inner, None)));
            }
            Some(Value::Array(items)) => {
                let formatted: Vec<Value> = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(inner) => Value::Object(format_map(inner, None)),
                        other => other,
                    })
                    .collect();
                map.insert(key, Value::Array(formatted));
            }
            _ => {}
        }
    }

    map
}

/// Mirror `_id` (string or `{"$oid": ...}`) into a plain string `id`.
fn normalize_id(map: &mut Map<String, Value>) {
    if let Some(raw) = map.remove("_id") {
        let id = match &raw {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("$oid").and_then(|v| v.as_str()).map(|s| s.to_string()),
            _ => None,
        };
        if let Some(id) = id {
            map.insert("id".to_string(), Value::String(id));
        }
    } else if let Some(existing) = map.get("id") {
        if !existing.is_string() {
            let id = existing.to_string().trim_matches('"').to_string();
            map.insert("id".to_string(), Value::String(id));
        }
    }
}

/// Fill `date`/`time` display strings for events from `start_date`.
fn derive_event_display(map: &mut Map<String, Value>, original: Option<&Map<String, Value>>) {
    let start = map
        .get("start_date")
        .and_then(parse_datetime)
        .or_else(|| original.and_then(|o| o.get("start_date")).and_then(parse_datetime));

    match start {
        Some(dt) => {
            let date_missing = match map.get("date") {
                None => true,
                Some(Value::String(s)) => s == DATE_UNAVAILABLE,
                _ => false,
            };
            if date_missing {
                map.insert("date".to_string(), Value::String(format_date(&dt)));
            }
            if !map.contains_key("time") {
                map.insert("time".to_string(), Value::String(format_time_12h(&dt)));
            }
        }
        None => {
            if !map.contains_key("date") {
                map.insert("date".to_string(), Value::String(DATE_UNAVAILABLE.to_string()));
            }
        }
    }
}

/// Resolve one image reference into a `<field>Url` key. Populated
/// references expose their path; bare references and absent fields fall
/// back to the kind's default asset. The source field is never written,
/// which is what keeps image data out of date fields.
fn resolve_image(map: &mut Map<String, Value>, field: &str, profile: &EntityProfile) {
    let key = url_key(field);
    if map.get(&key).map(|v| v.is_string()).unwrap_or(false) {
        return;
    }

    let resolved = match map.get(field) {
        Some(Value::Object(obj)) => {
            obj.get("path").and_then(|p| p.as_str()).map(|s| s.to_string())
        }
        Some(Value::String(s)) if s.starts_with('/') || s.starts_with("http") => Some(s.clone()),
        _ => None,
    };

    let url = resolved.unwrap_or_else(|| default_asset_url(profile));
    map.insert(key, Value::String(url));
}

fn default_asset_url(profile: &EntityProfile) -> String {
    let base = &config::config().content.asset_base;
    format!("{}/{}", base.trim_end_matches('/'), profile.default_asset)
}

/// `cover_image` -> `coverImageUrl`
fn url_key(field: &str) -> String {
    let mut out = String::new();
    for (i, part) in field.split('_').enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out.push_str("Url");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn event_gains_id_kind_date_time_and_default_image() {
        let result = format_response(json!({
            "_id": "507f191e810c19729de860ea",
            "title": "Sunday Service",
            "start_date": "2024-06-02T09:00:00Z"
        }));

        assert_eq!(result["id"], "507f191e810c19729de860ea");
        assert_eq!(result["kind"], "event");
        assert_eq!(result["date"], "June 2, 2024");
        assert_eq!(result["time"], "9:00 AM");
        assert_eq!(result["imageUrl"], "/assets/images/events/default.jpg");
        assert!(result.get("_id").is_none());
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = format_response(json!({
            "_id": "507f191e810c19729de860ea",
            "title": "Sunday Service",
            "start_date": "2024-06-02T09:00:00Z",
            "cover_image": {"path": "/uploads/service.jpg"}
        }));
        let twice = format_response(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn populated_image_reference_wins_over_default() {
        let result = format_response(json!({
            "title": "Easter Picnic",
            "start_date": "2025-04-20T12:00:00Z",
            "cover_image": {"path": "/uploads/picnic.jpg"}
        }));
        assert_eq!(result["coverImageUrl"], "/uploads/picnic.jpg");
        // the plain image slot still resolves to a default
        assert_eq!(result["imageUrl"], "/assets/images/events/default.jpg");
    }

    #[test]
    fn bare_reference_falls_back_to_default() {
        let result = format_response(json!({
            "title": "Grace and Truth",
            "speaker": "Rev. Adams",
            "date": "2024-03-10T00:00:00Z",
            "image": "65f1c0ffee0ddba11fe55e01"
        }));
        assert_eq!(result["kind"], "sermon");
        assert_eq!(result["imageUrl"], "/assets/images/sermons/default.jpg");
        assert_eq!(result["date"], "March 10, 2024");
    }

    #[test]
    fn corrupted_sermon_date_recovers_from_original_row() {
        let mut row = obj(json!({
            "id": "a1",
            "kind": "sermon",
            "title": "Hope",
            "speaker": "Rev. Adams",
            "date": "2024-03-10T00:00:00Z"
        }));
        let mut record = Record::from_sql_row(row.clone());
        // simulate the clobbering bug on the working copy only
        row.insert("date".to_string(), json!({"imageUrl": "/assets/oops.jpg"}));
        record.overwrite_fields(row);

        let result = format_record(&record);
        assert_eq!(result["date"], "March 10, 2024");
    }

    #[test]
    fn corrupted_date_without_original_degrades_to_sentinel() {
        let result = format_response(json!({
            "kind": "membership_renewal",
            "full_name": "John Doe",
            "renewal_date": {"imageUrl": "/assets/oops.jpg"}
        }));
        assert_eq!(result["renewal_date"], DATE_UNAVAILABLE);
    }

    #[test]
    fn kind_inference_prefers_workflow_shapes() {
        assert_eq!(
            infer_kind(&obj(json!({"full_name": "J", "member_since": "2020"}))),
            Some(EntityKind::MembershipRenewal)
        );
        assert_eq!(
            infer_kind(&obj(json!({"full_name": "J", "preferred_session": "Sunday"}))),
            Some(EntityKind::FoundationClass)
        );
        assert_eq!(
            infer_kind(&obj(json!({"name": "North Zone"}))),
            Some(EntityKind::Zone)
        );
        assert_eq!(infer_kind(&obj(json!({"unrelated": 1}))), None);
    }

    #[test]
    fn arrays_format_each_element() {
        let result = format_response(json!([
            {"title": "A", "speaker": "S", "date": "2024-01-01"},
            {"name": "North Zone"}
        ]));
        let items = result.as_array().unwrap();
        assert_eq!(items[0]["kind"], "sermon");
        assert_eq!(items[0]["date"], "January 1, 2024");
        assert_eq!(items[1]["kind"], "zone");
    }

    #[test]
    fn nested_objects_are_formatted_but_dates_are_not_recursed() {
        let result = format_response(json!({
            "name": "Youth Group",
            "zone_id": "z1",
            "zone": {"name": "North Zone", "_id": "z1"},
            "birthday": {"imageUrl": "/x.jpg"}
        }));
        assert_eq!(result["zone"]["id"], "z1");
        assert_eq!(result["zone"]["kind"], "zone");
        // corrupted object under a date name is left for date handling,
        // never formatted as a nested record
        assert!(result["birthday"].get("kind").is_none());
    }

    #[test]
    fn url_key_camel_cases() {
        assert_eq!(url_key("image"), "imageUrl");
        assert_eq!(url_key("cover_image"), "coverImageUrl");
        assert_eq!(url_key("leader_image"), "leaderImageUrl");
    }
}
