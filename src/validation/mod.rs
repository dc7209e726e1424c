// Declarative field validation: rule tables describe each entity's
// constraints, one generic engine evaluates them. The same tables run in
// the HTTP handlers (authoritative, 400 on failure) and in the service
// client (fail fast before any network I/O).
pub mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::format::dates;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

// Tolerates separators and an optional country code; 7-15 digits total.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?(?:[()\-\s.]*[0-9]){7,15}[()\-\s.]*$").expect("phone regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Date,
    Boolean,
}

/// Predicate over the whole candidate object, for conditionally required
/// fields such as `new_address` when `address_change` is set.
pub type RequiredIf = fn(&Map<String, Value>) -> bool;

pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub required_if: Option<RequiredIf>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub allowed: Option<&'static [&'static str]>,
    pub must_be_true: bool,
}

impl FieldRule {
    fn new(field: &'static str, label: &'static str, kind: FieldType) -> Self {
        Self {
            field,
            label,
            kind,
            required: false,
            required_if: None,
            min_len: None,
            max_len: None,
            allowed: None,
            must_be_true: false,
        }
    }

    pub fn text(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldType::Text)
    }

    pub fn email(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldType::Email)
    }

    pub fn phone(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldType::Phone)
    }

    pub fn date(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldType::Date)
    }

    pub fn boolean(field: &'static str, label: &'static str) -> Self {
        Self::new(field, label, FieldType::Boolean)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_if(mut self, predicate: RequiredIf) -> Self {
        self.required_if = Some(predicate);
        self
    }

    pub fn min_len(mut self, n: usize) -> Self {
        self.min_len = Some(n);
        self
    }

    pub fn max_len(mut self, n: usize) -> Self {
        self.max_len = Some(n);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn must_be_true(mut self) -> Self {
        self.must_be_true = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: HashMap<String, String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: HashMap::new() }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|s| s.as_str())
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Evaluate a rule table against a candidate object. The required check
/// precedes the type check; a missing optional field is skipped entirely.
pub fn validate_record(rules: &[FieldRule], candidate: &Map<String, Value>) -> ValidationReport {
    let mut report = ValidationReport::valid();

    for rule in rules {
        let value = candidate.get(rule.field);
        let required =
            rule.required || rule.required_if.map(|predicate| predicate(candidate)).unwrap_or(false);

        if is_missing(value) {
            if required {
                report.add(rule.field, format!("{} is required", rule.label));
            }
            continue;
        }

        let Some(value) = value else { continue };

        match rule.kind {
            FieldType::Text => validate_text(rule, value, &mut report),
            FieldType::Email => {
                let ok = value.as_str().map(|s| EMAIL_RE.is_match(s)).unwrap_or(false);
                if !ok {
                    report.add(rule.field, format!("{} must be a valid email address", rule.label));
                }
            }
            FieldType::Phone => {
                let ok = value.as_str().map(|s| PHONE_RE.is_match(s)).unwrap_or(false);
                if !ok {
                    report.add(rule.field, format!("{} must be a valid phone number", rule.label));
                }
            }
            FieldType::Date => {
                if dates::parse_datetime(value).is_none() {
                    report.add(rule.field, format!("{} must be a valid date", rule.label));
                }
            }
            FieldType::Boolean => match value {
                Value::Bool(b) => {
                    if rule.must_be_true && !b {
                        report.add(rule.field, format!("{} must be accepted", rule.label));
                    }
                }
                _ => report.add(rule.field, format!("{} must be true or false", rule.label)),
            },
        }
    }

    report
}

fn validate_text(rule: &FieldRule, value: &Value, report: &mut ValidationReport) {
    let Some(s) = value.as_str() else {
        report.add(rule.field, format!("{} must be text", rule.label));
        return;
    };

    if let Some(min) = rule.min_len {
        if s.trim().len() < min {
            report.add(rule.field, format!("{} must be at least {} characters", rule.label, min));
            return;
        }
    }
    if let Some(max) = rule.max_len {
        if s.len() > max {
            report.add(rule.field, format!("{} must be at most {} characters", rule.label, max));
            return;
        }
    }
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&s) {
            report.add(
                rule.field,
                format!("{} must be one of: {}", rule.label, allowed.join(", ")),
            );
        }
    }
}

/// Field names of a rule table, used to strip stray keys from API input
pub fn field_names(rules: &[FieldRule]) -> Vec<&'static str> {
    rules.iter().map(|rule| rule.field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn required_check_precedes_type_check() {
        let rules = [FieldRule::email("email", "Email").required()];
        let report = validate_record(&rules, &candidate(json!({})));
        assert!(!report.is_valid);
        assert_eq!(report.error("email"), Some("Email is required"));

        // whitespace-only counts as missing, not as an invalid email
        let report = validate_record(&rules, &candidate(json!({"email": "   "})));
        assert_eq!(report.error("email"), Some("Email is required"));
    }

    #[test]
    fn optional_fields_are_skipped_when_absent() {
        let rules = [FieldRule::text("notes", "Notes").max_len(10)];
        let report = validate_record(&rules, &candidate(json!({})));
        assert!(report.is_valid);
    }

    #[test]
    fn email_and_phone_formats() {
        let rules = [
            FieldRule::email("email", "Email").required(),
            FieldRule::phone("phone", "Phone").required(),
        ];

        let good = candidate(json!({"email": "john@example.com", "phone": "+1 (555) 123-4567"}));
        assert!(validate_record(&rules, &good).is_valid);

        let bad = candidate(json!({"email": "john@example", "phone": "call me"}));
        let report = validate_record(&rules, &bad);
        assert!(report.error("email").is_some());
        assert!(report.error("phone").is_some());
    }

    #[test]
    fn conditional_requirement_sees_whole_candidate() {
        let rules = [FieldRule::text("new_address", "New address").required_if(|c| {
            c.get("address_change").and_then(|v| v.as_bool()).unwrap_or(false)
        })];

        let moved = candidate(json!({"address_change": true, "new_address": ""}));
        assert_eq!(
            validate_record(&rules, &moved).error("new_address"),
            Some("New address is required")
        );

        let stayed = candidate(json!({"address_change": false}));
        assert!(validate_record(&rules, &stayed).is_valid);
    }

    #[test]
    fn boolean_must_be_true() {
        let rules = [FieldRule::boolean("agree_to_terms", "Terms agreement")
            .required()
            .must_be_true()];

        let report = validate_record(&rules, &candidate(json!({"agree_to_terms": false})));
        assert_eq!(report.error("agree_to_terms"), Some("Terms agreement must be accepted"));

        let report = validate_record(&rules, &candidate(json!({"agree_to_terms": "yes"})));
        assert_eq!(report.error("agree_to_terms"), Some("Terms agreement must be true or false"));
    }

    #[test]
    fn text_length_and_enum_constraints() {
        let rules = [FieldRule::text("status", "Status")
            .required()
            .one_of(&["pending", "approved"])];
        let report = validate_record(&rules, &candidate(json!({"status": "graduated"})));
        assert_eq!(report.error("status"), Some("Status must be one of: pending, approved"));

        let rules = [FieldRule::text("full_name", "Full name").required().min_len(2)];
        let report = validate_record(&rules, &candidate(json!({"full_name": "J"})));
        assert!(report.error("full_name").is_some());
    }
}
