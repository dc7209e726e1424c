use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde_json::{Map, Value};

/// Sentinel shown when no valid date can be recovered for a display field.
pub const DATE_UNAVAILABLE: &str = "Date unavailable";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render a datetime as `"Month D, YYYY"` (no zero padding on the day).
pub fn format_date(dt: &DateTime<Utc>) -> String {
    format!("{} {}, {}", MONTHS[dt.month0() as usize], dt.day(), dt.year())
}

/// Render the time-of-day portion on a 12-hour clock, e.g. `"9:00 AM"`.
pub fn format_time_12h(dt: &DateTime<Utc>) -> String {
    let (pm, hour) = dt.hour12();
    format!("{}:{:02} {}", hour, dt.minute(), if pm { "PM" } else { "AM" })
}

/// Parse a raw JSON value into a datetime. Strings cover the formats the
/// legacy data actually contains; numbers are epoch milliseconds.
pub fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
        return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
    }
    None
}

/// `"Month D, YYYY"` for any value that parses as a real datetime, `None`
/// for everything else (corrupted objects, junk strings, nulls).
pub fn format_date_to_string(value: &Value) -> Option<String> {
    parse_datetime(value).map(|dt| format_date(&dt))
}

/// Heuristic: a string with a comma and an alphabetic character is already
/// a display date and passes through untouched.
pub fn is_preformatted(s: &str) -> bool {
    s.contains(',') && s.chars().any(|c| c.is_alphabetic())
}

/// Recover a date from the original database row, preferring it over the
/// current copy. The current copy is the one that gets clobbered.
pub fn extract_original_date(original: Option<&Map<String, Value>>, field: &str) -> Option<String> {
    let value = original?.get(field)?;
    if let Some(formatted) = format_date_to_string(value) {
        return Some(formatted);
    }
    if let Value::String(s) = value {
        if is_preformatted(s) {
            return Some(s.clone());
        }
    }
    None
}

/// Full recovery chain for a date display field: original-row recovery,
/// then datetime formatting, then preformatted pass-through, then the
/// sentinel. Never fails.
pub fn process_date_field(
    current: &Map<String, Value>,
    original: Option<&Map<String, Value>>,
    field: &str,
) -> String {
    if let Some(recovered) = extract_original_date(original, field) {
        return recovered;
    }

    match current.get(field) {
        Some(value) => {
            if let Some(formatted) = format_date_to_string(value) {
                return formatted;
            }
            if let Value::String(s) = value {
                if is_preformatted(s) {
                    return s.clone();
                }
            }
            DATE_UNAVAILABLE.to_string()
        }
        None => DATE_UNAVAILABLE.to_string(),
    }
}
