use serde_json::{Map, Value};
use std::collections::HashSet;

/// System fields that can only be set by the server, not by API input
const SYSTEM_FIELDS: &[&str] = &["id", "_id", "status", "created_at", "updated_at"];

/// Errors that can occur during Record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(String),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// A dynamic record representing one database row, with the original row
/// state retained so downstream formatting can recover fields that were
/// clobbered on the working copy.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Original state from the database (None for CREATE operations)
    original: Option<Map<String, Value>>,
    /// Current field values
    fields: Map<String, Value>,
    /// Fields modified since the original was loaded
    modified_fields: HashSet<String>,
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create record from API input JSON, rejecting system fields
    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(map) => {
                let mut record = Self::new();
                for (key, value) in map {
                    if SYSTEM_FIELDS.contains(&key.as_str()) {
                        return Err(RecordError::SystemFieldNotAllowed(key));
                    }
                    record.fields.insert(key, value);
                }
                Ok(record)
            }
            _ => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        }
    }

    /// Create record from a database row (system fields allowed)
    pub fn from_sql_row(data: Map<String, Value>) -> Self {
        Self {
            original: Some(data.clone()),
            fields: data,
            modified_fields: HashSet::new(),
        }
    }

    /// Get field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set field value with change tracking
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();

        // System fields go through set_system_field
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            tracing::warn!("Attempted to set system field '{}' - ignoring", key);
            return self;
        }

        if self.original.is_some() {
            self.modified_fields.insert(key.clone());
        }
        self.fields.insert(key, value.into());
        self
    }

    /// Set system field (server-side code only)
    pub fn set_system_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let key = key.into();
        if self.original.is_some() {
            self.modified_fields.insert(key.clone());
        }
        self.fields.insert(key, value.into());
        self
    }

    /// Set field only if it's currently absent or null
    pub fn set_if_empty(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let key = key.into();
        match self.fields.get(&key) {
            None | Some(Value::Null) => {
                self.set(key, value);
            }
            Some(_) => {}
        }
        self
    }

    /// Drop every field not in the allowlist. Run on API input before an
    /// INSERT so stray payload keys never reach the SQL layer.
    pub fn retain_fields(&mut self, allowed: &[&str]) -> &mut Self {
        self.fields.retain(|key, _| allowed.contains(&key.as_str()));
        self
    }

    /// Replace the working copy wholesale, keeping the original snapshot.
    pub fn overwrite_fields(&mut self, fields: Map<String, Value>) -> &mut Self {
        self.fields = fields;
        self
    }

    /// Get record ID as a string
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(|v| v.as_str())
    }

    /// Get original row (before changes)
    pub fn original(&self) -> Option<&Map<String, Value>> {
        self.original.as_ref()
    }

    /// Get original value for a specific field
    pub fn get_original(&self, key: &str) -> Option<&Value> {
        self.original.as_ref()?.get(key)
    }

    /// Check if a specific field has been changed since load
    pub fn changed(&self, key: &str) -> bool {
        match (&self.original, self.fields.get(key)) {
            (Some(original), Some(current)) => original.get(key) != Some(current),
            (Some(original), None) => original.contains_key(key),
            (None, Some(_)) => true,
            (None, None) => false,
        }
    }

    /// Current fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume into the current field map
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Convert to JSON Value (all fields)
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_sql_row(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.to_json()
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Record(id: {:?}, fields: {})", self.id(), self.fields.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_input_rejects_system_fields() {
        let err = Record::from_json(json!({"full_name": "J", "status": "approved"})).unwrap_err();
        assert!(matches!(err, RecordError::SystemFieldNotAllowed(f) if f == "status"));

        let err = Record::from_json(json!("not an object")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidJson(_)));
    }

    #[test]
    fn set_ignores_system_fields_but_system_setter_works() {
        let mut record = Record::from_json(json!({"full_name": "J"})).unwrap();
        record.set("status", "approved");
        assert!(record.get("status").is_none());

        record.set_system_field("status", "pending");
        assert_eq!(record.get("status"), Some(&json!("pending")));
    }

    #[test]
    fn original_row_survives_overwrites() {
        let mut row = Map::new();
        row.insert("id".to_string(), json!("a1"));
        row.insert("date".to_string(), json!("2024-03-10T00:00:00Z"));

        let mut record = Record::from_sql_row(row);
        record.set_system_field("date", json!({"imageUrl": "/oops.jpg"}));

        assert!(record.changed("date"));
        assert_eq!(record.get_original("date"), Some(&json!("2024-03-10T00:00:00Z")));
    }

    #[test]
    fn retain_fields_drops_strays() {
        let mut record =
            Record::from_json(json!({"full_name": "J", "email": "j@x.com", "admin": true}))
                .unwrap();
        record.retain_fields(&["full_name", "email"]);
        assert!(record.get("admin").is_none());
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn set_if_empty_respects_existing_values() {
        let mut record = Record::from_json(json!({"member_since": "2020"})).unwrap();
        record.set_if_empty("member_since", json!("2024"));
        record.set_if_empty("ministry_involvement", json!("choir"));
        assert_eq!(record.get("member_since"), Some(&json!("2020")));
        assert_eq!(record.get("ministry_involvement"), Some(&json!("choir")));
    }
}
