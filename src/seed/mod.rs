// Fixture seeding for a fresh database: schema DDL, the default admin
// account, zones, cell groups, and sample content. Zone ids are returned
// from the zone seeder and passed explicitly into the cell-group seeder;
// nothing here goes through shared state.
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth;
use crate::database::{DatabaseError, Repository};

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub zones: usize,
    pub cell_groups: usize,
    pub content_records: usize,
    pub admin_created: bool,
}

const SCHEMA_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS sermons (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'sermon',
        title TEXT NOT NULL,
        speaker TEXT,
        date TEXT,
        scripture TEXT,
        summary TEXT,
        video_url TEXT,
        audio_url TEXT,
        image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'event',
        title TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        location TEXT,
        description TEXT,
        image JSONB,
        cover_image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS leaders (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'leader',
        name TEXT NOT NULL,
        role TEXT,
        bio TEXT,
        email TEXT,
        image JSONB,
        leader_image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS zones (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'zone',
        name TEXT NOT NULL,
        description TEXT,
        coordinator TEXT,
        image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS cell_groups (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'cell_group',
        name TEXT NOT NULL,
        zone_id TEXT,
        leader_name TEXT,
        meeting_day TEXT,
        meeting_time TEXT,
        address TEXT,
        image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS media (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'media',
        title TEXT NOT NULL,
        category TEXT,
        url TEXT,
        published_date TEXT,
        image JSONB,
        cover_image JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS membership_renewals (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'membership_renewal',
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        birthday TEXT,
        member_since TEXT,
        ministry_involvement TEXT,
        address_change BOOLEAN,
        new_address TEXT,
        agree_to_terms BOOLEAN,
        renewal_date TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS foundation_class_registrations (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'foundation_class',
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        preferred_session TEXT,
        questions TEXT,
        registration_date TEXT,
        status TEXT NOT NULL DEFAULT 'registered',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS event_signups (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL DEFAULT 'event_signup',
        event_id TEXT,
        event_type TEXT,
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        testimony TEXT,
        previous_religion TEXT,
        child_name TEXT,
        child_date_of_birth TEXT,
        parent_names TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS admin_users (
        id TEXT PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_digest TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'admin',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

pub async fn run(pool: &PgPool) -> Result<SeedSummary, DatabaseError> {
    create_tables(pool).await?;

    let mut summary = SeedSummary::default();
    summary.admin_created = seed_admin(pool).await?;

    let zone_ids = seed_zones(pool, &mut summary).await?;
    summary.cell_groups = seed_cell_groups(pool, &zone_ids).await?;
    summary.content_records = seed_content(pool).await?;

    Ok(summary)
}

async fn create_tables(pool: &PgPool) -> Result<(), DatabaseError> {
    for ddl in SCHEMA_DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Create the default admin account unless one exists. Password comes
/// from PARISH_ADMIN_PASSWORD; the "admin" fallback is only for local
/// databases (production logins use real accounts, never the dev path).
async fn seed_admin(pool: &PgPool) -> Result<bool, DatabaseError> {
    let repo = Repository::new("admin_users")?;
    if !repo.fetch_where(pool, "username", "admin").await?.is_empty() {
        return Ok(false);
    }

    let password = std::env::var("PARISH_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let mut fields = Map::new();
    fields.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    fields.insert("username".to_string(), json!("admin"));
    fields.insert("password_digest".to_string(), json!(auth::password_digest("admin", &password)));
    fields.insert("role".to_string(), json!("admin"));

    repo.insert(pool, fields).await?;
    tracing::info!("Seeded default admin account");
    Ok(true)
}

/// Seed zones and return their ids keyed by zone name. Callers thread
/// this map into whatever needs zone references.
async fn seed_zones(
    pool: &PgPool,
    summary: &mut SeedSummary,
) -> Result<HashMap<String, String>, DatabaseError> {
    let repo = Repository::new("zones")?;
    let mut zone_ids = HashMap::new();

    for fixture in zone_fixtures() {
        let name = fixture.get("name").and_then(|v| v.as_str()).unwrap_or("").to_string();

        let existing = repo.fetch_where(pool, "name", &name).await?;
        if let Some(record) = existing.first() {
            if let Some(id) = record.id() {
                zone_ids.insert(name, id.to_string());
            }
            continue;
        }

        let saved = repo.insert(pool, fixture).await?;
        if let Some(id) = saved.id() {
            zone_ids.insert(name, id.to_string());
        }
        summary.zones += 1;
    }

    Ok(zone_ids)
}

async fn seed_cell_groups(
    pool: &PgPool,
    zone_ids: &HashMap<String, String>,
) -> Result<usize, DatabaseError> {
    let repo = Repository::new("cell_groups")?;
    let mut created = 0;

    for fixture in cell_group_fixtures() {
        let Some(fixture) = link_zone(fixture, zone_ids) else { continue };

        let name = fixture.get("name").and_then(|v| v.as_str()).unwrap_or("").to_string();
        if !repo.fetch_where(pool, "name", &name).await?.is_empty() {
            continue;
        }

        repo.insert(pool, fixture).await?;
        created += 1;
    }

    Ok(created)
}

async fn seed_content(pool: &PgPool) -> Result<usize, DatabaseError> {
    let mut created = 0;

    for (table, fixtures) in content_fixtures() {
        let repo = Repository::new(table)?;
        for fixture in fixtures {
            let title_field = if table == "leaders" { "name" } else { "title" };
            let title =
                fixture.get(title_field).and_then(|v| v.as_str()).unwrap_or("").to_string();
            if !repo.fetch_where(pool, title_field, &title).await?.is_empty() {
                continue;
            }
            repo.insert(pool, fixture).await?;
            created += 1;
        }
    }

    Ok(created)
}

/// Swap a fixture's `zone_name` for the seeded zone's id. Returns None
/// (and logs) when the referenced zone was never seeded.
pub fn link_zone(
    mut fixture: Map<String, Value>,
    zone_ids: &HashMap<String, String>,
) -> Option<Map<String, Value>> {
    let zone_name = match fixture.remove("zone_name") {
        Some(Value::String(name)) => name,
        _ => {
            tracing::warn!("cell group fixture missing zone_name, skipping");
            return None;
        }
    };

    match zone_ids.get(&zone_name) {
        Some(id) => {
            fixture.insert("zone_id".to_string(), json!(id));
            Some(fixture)
        }
        None => {
            tracing::warn!("no seeded zone named '{}', skipping cell group", zone_name);
            None
        }
    }
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn zone_fixtures() -> Vec<Map<String, Value>> {
    vec![
        object(json!({
            "kind": "zone",
            "name": "North Zone",
            "description": "Households north of the river",
            "coordinator": "Grace Mensah",
        })),
        object(json!({
            "kind": "zone",
            "name": "South Zone",
            "description": "Households south of the river",
            "coordinator": "Daniel Osei",
        })),
        object(json!({
            "kind": "zone",
            "name": "Central Zone",
            "description": "City-centre households",
            "coordinator": "Ruth Ampofo",
        })),
    ]
}

fn cell_group_fixtures() -> Vec<Map<String, Value>> {
    vec![
        object(json!({
            "kind": "cell_group",
            "name": "Riverside Fellowship",
            "zone_name": "North Zone",
            "leader_name": "Kwame Boateng",
            "meeting_day": "Wednesday",
            "meeting_time": "19:00",
            "address": "12 Riverside Close",
        })),
        object(json!({
            "kind": "cell_group",
            "name": "Hillview Cell",
            "zone_name": "South Zone",
            "leader_name": "Abena Owusu",
            "meeting_day": "Thursday",
            "meeting_time": "18:30",
            "address": "3 Hillview Road",
        })),
        object(json!({
            "kind": "cell_group",
            "name": "City Lights Cell",
            "zone_name": "Central Zone",
            "leader_name": "Samuel Adjei",
            "meeting_day": "Tuesday",
            "meeting_time": "19:30",
            "address": "45 Market Street",
        })),
    ]
}

fn content_fixtures() -> Vec<(&'static str, Vec<Map<String, Value>>)> {
    vec![
        (
            "sermons",
            vec![object(json!({
                "kind": "sermon",
                "title": "Grace and Truth",
                "speaker": "Rev. Adams",
                "date": "2024-03-10T00:00:00Z",
                "scripture": "John 1:14-17",
                "summary": "Walking in grace without letting go of truth.",
            }))],
        ),
        (
            "events",
            vec![object(json!({
                "kind": "event",
                "title": "Sunday Service",
                "start_date": "2024-06-02T09:00:00Z",
                "location": "Main Auditorium",
                "description": "Weekly worship service.",
            }))],
        ),
        (
            "leaders",
            vec![object(json!({
                "kind": "leader",
                "name": "Rev. Adams",
                "role": "Senior Pastor",
                "email": "pastor@example.org",
            }))],
        ),
        (
            "media",
            vec![object(json!({
                "kind": "media",
                "title": "Easter Choir Special",
                "category": "music",
                "url": "https://media.example.org/easter-choir",
                "published_date": "2024-03-31T00:00:00Z",
            }))],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_zone_threads_ids_explicitly() {
        let mut zone_ids = HashMap::new();
        zone_ids.insert("North Zone".to_string(), "z-123".to_string());

        let fixture = cell_group_fixtures().remove(0);
        let linked = link_zone(fixture, &zone_ids).expect("linked");
        assert_eq!(linked.get("zone_id"), Some(&json!("z-123")));
        assert!(linked.get("zone_name").is_none());
    }

    #[test]
    fn link_zone_skips_unknown_zones() {
        let zone_ids = HashMap::new();
        let fixture = cell_group_fixtures().remove(1);
        assert!(link_zone(fixture, &zone_ids).is_none());
    }

    #[test]
    fn fixtures_reference_seeded_zones() {
        let zone_names: Vec<String> = zone_fixtures()
            .iter()
            .filter_map(|z| z.get("name").and_then(|v| v.as_str()).map(str::to_string))
            .collect();

        for fixture in cell_group_fixtures() {
            let zone_name = fixture.get("zone_name").and_then(|v| v.as_str()).unwrap();
            assert!(zone_names.contains(&zone_name.to_string()), "unknown zone {}", zone_name);
        }
    }
}
