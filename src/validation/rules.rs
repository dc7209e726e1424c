// Rule tables for the entities accepted over HTTP, plus the allowed
// status transitions for each workflow.
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use super::{validate_record, FieldRule, ValidationReport};
use crate::format::EntityKind;

pub const MEMBERSHIP_STATUSES: &[&str] = &["pending", "approved", "declined"];
pub const FOUNDATION_CLASS_STATUSES: &[&str] =
    &["registered", "attending", "completed", "cancelled"];
pub const EVENT_SIGNUP_STATUSES: &[&str] = &["pending", "approved", "declined"];
pub const EVENT_TYPES: &[&str] = &["baptism", "baby_dedication", "other"];

fn address_changed(candidate: &Map<String, Value>) -> bool {
    candidate.get("address_change").and_then(|v| v.as_bool()).unwrap_or(false)
}

fn is_baby_dedication(candidate: &Map<String, Value>) -> bool {
    candidate.get("event_type").and_then(|v| v.as_str()) == Some("baby_dedication")
}

static MEMBERSHIP_RENEWAL_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("full_name", "Full name").required().min_len(2).max_len(100),
        FieldRule::email("email", "Email").required(),
        FieldRule::phone("phone", "Phone").required(),
        FieldRule::date("birthday", "Birthday").required(),
        FieldRule::text("member_since", "Member since").required().max_len(20),
        FieldRule::text("ministry_involvement", "Ministry involvement").max_len(200),
        FieldRule::boolean("address_change", "Address change"),
        FieldRule::text("new_address", "New address").required_if(address_changed).max_len(200),
        FieldRule::boolean("agree_to_terms", "Terms agreement").required().must_be_true(),
    ]
});

static FOUNDATION_CLASS_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("full_name", "Full name").required().min_len(2).max_len(100),
        FieldRule::email("email", "Email").required(),
        FieldRule::phone("phone", "Phone").required(),
        FieldRule::text("preferred_session", "Preferred session").required().max_len(100),
        FieldRule::text("questions", "Questions").max_len(500),
    ]
});

static EVENT_SIGNUP_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("event_type", "Event type").required().one_of(EVENT_TYPES),
        FieldRule::text("full_name", "Full name").required().min_len(2).max_len(100),
        FieldRule::email("email", "Email").required(),
        FieldRule::phone("phone", "Phone").required(),
        FieldRule::text("testimony", "Testimony").max_len(1000),
        FieldRule::text("previous_religion", "Previous religion").max_len(100),
        FieldRule::text("child_name", "Child name").required_if(is_baby_dedication).max_len(100),
        FieldRule::date("child_date_of_birth", "Child date of birth")
            .required_if(is_baby_dedication),
        FieldRule::text("parent_names", "Parent names")
            .required_if(is_baby_dedication)
            .max_len(200),
    ]
});

static SERMON_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("title", "Title").required().max_len(200),
        FieldRule::text("speaker", "Speaker").required().max_len(100),
        FieldRule::date("date", "Date").required(),
        FieldRule::text("scripture", "Scripture").max_len(200),
        FieldRule::text("summary", "Summary").max_len(2000),
        FieldRule::text("video_url", "Video URL").max_len(500),
        FieldRule::text("audio_url", "Audio URL").max_len(500),
    ]
});

static EVENT_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("title", "Title").required().max_len(200),
        FieldRule::date("start_date", "Start date").required(),
        FieldRule::date("end_date", "End date"),
        FieldRule::text("location", "Location").max_len(200),
        FieldRule::text("description", "Description").max_len(2000),
    ]
});

static LEADER_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("name", "Name").required().max_len(100),
        FieldRule::text("role", "Role").required().max_len(100),
        FieldRule::text("bio", "Bio").max_len(2000),
        FieldRule::email("email", "Email"),
    ]
});

static CELL_GROUP_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("name", "Name").required().max_len(100),
        FieldRule::text("zone_id", "Zone").required().max_len(64),
        FieldRule::text("leader_name", "Leader name").max_len(100),
        FieldRule::text("meeting_day", "Meeting day").max_len(20),
        FieldRule::text("meeting_time", "Meeting time").max_len(20),
        FieldRule::text("address", "Address").max_len(200),
    ]
});

static ZONE_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("name", "Name").required().max_len(100),
        FieldRule::text("description", "Description").max_len(1000),
        FieldRule::text("coordinator", "Coordinator").max_len(100),
    ]
});

static MEDIA_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::text("title", "Title").required().max_len(200),
        FieldRule::text("url", "URL").required().max_len(500),
        FieldRule::text("category", "Category").max_len(100),
        FieldRule::date("published_date", "Published date"),
    ]
});

static NOTIFICATION_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule::email("recipient", "Recipient").required(),
        FieldRule::text("subject", "Subject").required().max_len(200),
        FieldRule::text("message", "Message").required().max_len(2000),
    ]
});

pub fn membership_renewal_rules() -> &'static [FieldRule] {
    &MEMBERSHIP_RENEWAL_RULES
}

pub fn foundation_class_rules() -> &'static [FieldRule] {
    &FOUNDATION_CLASS_RULES
}

pub fn event_signup_rules() -> &'static [FieldRule] {
    &EVENT_SIGNUP_RULES
}

pub fn notification_rules() -> &'static [FieldRule] {
    &NOTIFICATION_RULES
}

/// Rules for admin-managed content entities
pub fn content_rules(kind: EntityKind) -> &'static [FieldRule] {
    match kind {
        EntityKind::Sermon => &SERMON_RULES,
        EntityKind::Event => &EVENT_RULES,
        EntityKind::Leader => &LEADER_RULES,
        EntityKind::CellGroup => &CELL_GROUP_RULES,
        EntityKind::Zone => &ZONE_RULES,
        EntityKind::Media => &MEDIA_RULES,
        EntityKind::MembershipRenewal => &MEMBERSHIP_RENEWAL_RULES,
        EntityKind::FoundationClass => &FOUNDATION_CLASS_RULES,
        EntityKind::EventSignup => &EVENT_SIGNUP_RULES,
    }
}

pub fn validate_membership_renewal(candidate: &Map<String, Value>) -> ValidationReport {
    validate_record(membership_renewal_rules(), candidate)
}

pub fn validate_foundation_class_registration(candidate: &Map<String, Value>) -> ValidationReport {
    validate_record(foundation_class_rules(), candidate)
}

pub fn validate_event_signup(candidate: &Map<String, Value>) -> ValidationReport {
    validate_record(event_signup_rules(), candidate)
}

/// Degenerate single-field validation against a fixed status list
fn validate_status(allowed: &'static [&'static str], status: &str) -> ValidationReport {
    let rules = [FieldRule::text("status", "Status").required().one_of(allowed)];
    let mut candidate = Map::new();
    candidate.insert("status".to_string(), json!(status));
    validate_record(&rules, &candidate)
}

pub fn validate_membership_status(status: &str) -> ValidationReport {
    validate_status(MEMBERSHIP_STATUSES, status)
}

pub fn validate_foundation_class_status(status: &str) -> ValidationReport {
    validate_status(FOUNDATION_CLASS_STATUSES, status)
}

pub fn validate_event_signup_status(status: &str) -> ValidationReport {
    validate_status(EVENT_SIGNUP_STATUSES, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    fn valid_renewal() -> Map<String, Value> {
        candidate(json!({
            "full_name": "John Doe",
            "email": "john@example.com",
            "phone": "1234567890",
            "birthday": "1990-01-01",
            "member_since": "2020",
            "agree_to_terms": true
        }))
    }

    #[test]
    fn complete_renewal_passes() {
        let report = validate_membership_renewal(&valid_renewal());
        assert!(report.is_valid, "errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn address_change_requires_new_address() {
        let mut renewal = valid_renewal();
        renewal.insert("address_change".to_string(), json!(true));
        renewal.insert("new_address".to_string(), json!(""));

        let report = validate_membership_renewal(&renewal);
        assert!(!report.is_valid);
        assert!(report.error("new_address").is_some());
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut renewal = valid_renewal();
        renewal.insert("agree_to_terms".to_string(), json!(false));
        assert!(validate_membership_renewal(&renewal).error("agree_to_terms").is_some());
    }

    #[test]
    fn foundation_class_requires_session() {
        let report = validate_foundation_class_registration(&candidate(json!({
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-123-4567"
        })));
        assert_eq!(report.error("preferred_session"), Some("Preferred session is required"));
    }

    #[test]
    fn baby_dedication_needs_child_fields() {
        let report = validate_event_signup(&candidate(json!({
            "event_type": "baby_dedication",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "5551234567"
        })));
        assert!(report.error("child_name").is_some());
        assert!(report.error("child_date_of_birth").is_some());
        assert!(report.error("parent_names").is_some());

        // baptism signups don't need them
        let report = validate_event_signup(&candidate(json!({
            "event_type": "baptism",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "5551234567"
        })));
        assert!(report.is_valid, "errors: {:?}", report.errors);
    }

    #[test]
    fn status_enums_are_closed() {
        assert!(validate_membership_status("approved").is_valid);
        assert!(!validate_membership_status("graduated").is_valid);
        assert!(validate_membership_status("graduated").error("status").is_some());

        assert!(validate_foundation_class_status("attending").is_valid);
        assert!(!validate_foundation_class_status("graduated").is_valid);

        assert!(validate_event_signup_status("declined").is_valid);
        assert!(!validate_event_signup_status("").is_valid);
        assert_eq!(validate_event_signup_status("").error("status"), Some("Status is required"));
    }
}
