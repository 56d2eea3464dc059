//! Ordered field lookup tables and the helpers that walk them.
//!
//! Each table is searched front to back over a record's flattened
//! attributes; the first candidate holding a usable value wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::model::Attributes;

pub const TIMESTAMP_FIELDS: &[&str] = &[
    "@timestamp",
    "timestamp",
    "time",
    "datetime",
    "date",
    "created_at",
];

pub const LEVEL_FIELDS: &[&str] = &["level", "log.level", "severity", "loglevel"];

pub const MESSAGE_FIELDS: &[&str] = &["message", "msg", "text", "log", "log.message"];

pub const ID_FIELDS: &[&str] = &["id", "_id"];

pub const INDEX_FIELDS: &[&str] = &["_index", "index"];

pub const STATUS_FIELDS: &[&str] = &[
    "http.status_code",
    "http.response.status_code",
    "status_code",
    "status",
    "response.status",
    "statusCode",
];

pub const DURATION_FIELDS: &[&str] = &[
    "duration",
    "duration_ms",
    "http.duration",
    "response_time",
    "responseTime",
    "elapsed",
    "latency",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// First string-typed value among `candidates`.
pub fn first_string<'a>(attrs: &'a Attributes, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|key| attrs.get(*key).and_then(Value::as_str))
}

/// First string or number among `candidates`, as text.
pub fn first_scalar_text(attrs: &Attributes, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|key| match attrs.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric value among `candidates`; numeric strings count.
pub fn first_number(attrs: &Attributes, candidates: &[&str]) -> Option<f64> {
    candidates.iter().find_map(|key| match attrs.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Lenient timestamp parsing.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` (as UTC, `,` allowed
/// as fraction separator), the same with a numeric offset, and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let normalized = s.replacen(',', ".", 1);

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = normalized
        .strip_suffix('Z')
        .or_else(|| normalized.strip_suffix('z'))
        .unwrap_or(&normalized);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_first_string_respects_priority() {
        let a = attrs(&[
            ("time", json!("2024-01-02T00:00:00Z")),
            ("@timestamp", json!("2024-01-01T00:00:00Z")),
        ]);
        assert_eq!(
            first_string(&a, TIMESTAMP_FIELDS),
            Some("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_first_string_skips_non_strings() {
        let a = attrs(&[("timestamp", json!(1704067200)), ("time", json!("later"))]);
        assert_eq!(first_string(&a, TIMESTAMP_FIELDS), Some("later"));
    }

    #[test]
    fn test_first_string_none() {
        let a = attrs(&[("other", json!("x"))]);
        assert_eq!(first_string(&a, LEVEL_FIELDS), None);
    }

    #[test]
    fn test_first_scalar_text() {
        let a = attrs(&[("id", json!(42))]);
        assert_eq!(first_scalar_text(&a, ID_FIELDS), Some("42".to_string()));
        let b = attrs(&[("id", json!({"nested": true})), ("_id", json!("abc"))]);
        assert_eq!(first_scalar_text(&b, ID_FIELDS), Some("abc".to_string()));
    }

    #[test]
    fn test_first_number_accepts_numeric_strings() {
        let a = attrs(&[("status", json!(" 404 "))]);
        assert_eq!(first_number(&a, STATUS_FIELDS), Some(404.0));
        let b = attrs(&[("status", json!("ok"))]);
        assert_eq!(first_number(&b, STATUS_FIELDS), None);
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2024-01-01T12:30:00.250+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T10:30:00.250+00:00");
    }

    #[test]
    fn test_parse_naive_space_separated() {
        let dt = parse_timestamp("2024-03-05 08:09:10").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T08:09:10+00:00");
    }

    #[test]
    fn test_parse_comma_fraction() {
        let dt = parse_timestamp("2024-03-05 08:09:10,500").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_parse_compact_offset() {
        let dt = parse_timestamp("2024-03-05T08:09:10+0100").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T07:09:10+00:00");
    }

    #[test]
    fn test_parse_space_separated_zulu() {
        let dt = parse_timestamp("2024-03-05 08:09:10Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T08:09:10+00:00");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }
}
