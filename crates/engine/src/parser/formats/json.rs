//! JSON sources: a single array of records, or newline-delimited objects.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::parser::fields::{
    first_scalar_text, first_string, ID_FIELDS, INDEX_FIELDS, LEVEL_FIELDS, MESSAGE_FIELDS,
    TIMESTAMP_FIELDS,
};
use crate::parser::flatten::flatten;
use crate::parser::model::{LoadError, LogRecord};

use super::plain;

/// Result of parsing one NDJSON line.
#[derive(Debug)]
pub enum LineOutcome {
    /// The line held a JSON object
    Structured(LogRecord),
    /// The line was not a JSON object and was kept as plain text
    Fallback(LogRecord),
}

/// Parse `content` as a JSON array, returning its elements.
pub fn parse_array(content: &str) -> Result<Vec<Value>, LoadError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| LoadError::InvalidJson(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(LoadError::NotAnArray),
    }
}

/// Normalize one array element. Non-object elements become plain-text
/// records holding their string form.
pub fn normalize_element(value: &Value, position: usize, ingested_at: DateTime<Utc>) -> LogRecord {
    match value {
        Value::Object(obj) => normalize_object(obj, position, ingested_at),
        Value::String(s) => plain::parse_line(s, synthesized_id(position), ingested_at),
        other => plain::parse_line(&other.to_string(), synthesized_id(position), ingested_at),
    }
}

/// Parse one NDJSON line. Anything that is not a JSON object is
/// downgraded to a plain-text record instead of failing the load.
pub fn parse_ndjson_line(line: &str, position: usize, ingested_at: DateTime<Utc>) -> LineOutcome {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(obj)) => LineOutcome::Structured(normalize_object(&obj, position, ingested_at)),
        Ok(_) | Err(_) => {
            LineOutcome::Fallback(plain::parse_line(line, synthesized_id(position), ingested_at))
        }
    }
}

/// Normalize one JSON object into a record.
///
/// Search-hit envelopes (`{"_index", "_id", "_source": {..}}`) are
/// unwrapped first: `_source` supplies the fields, `_id` and `_index`
/// supply the id and index. The remaining envelope fields (`_score`,
/// `sort`, ...) are kept as attributes; `_source` wins on collision.
pub fn normalize_object(
    obj: &Map<String, Value>,
    position: usize,
    ingested_at: DateTime<Utc>,
) -> LogRecord {
    if let Some(Value::Object(source)) = obj.get("_source") {
        let hit_id = scalar_text(obj.get("_id"));
        let hit_index = obj.get("_index").and_then(Value::as_str).map(str::to_string);

        let mut merged: Map<String, Value> = obj
            .iter()
            .filter(|(key, _)| key.as_str() != "_source")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merged.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
        return build_record(&merged, position, ingested_at, hit_id, hit_index);
    }
    build_record(obj, position, ingested_at, None, None)
}

fn build_record(
    obj: &Map<String, Value>,
    position: usize,
    ingested_at: DateTime<Utc>,
    id_override: Option<String>,
    index_override: Option<String>,
) -> LogRecord {
    let attributes = flatten(obj);

    let found = first_string(&attributes, TIMESTAMP_FIELDS).map(str::to_string);
    let defaulted = found.is_none();
    let timestamp = found.unwrap_or_else(|| ingested_at.to_rfc3339());
    let level = first_string(&attributes, LEVEL_FIELDS).map(|l| l.to_uppercase());
    let message = first_string(&attributes, MESSAGE_FIELDS).map(str::to_string);

    let id = id_override
        .or_else(|| first_scalar_text(&attributes, ID_FIELDS))
        .unwrap_or_else(|| synthesized_id(position));
    let index = index_override
        .or_else(|| first_string(&attributes, INDEX_FIELDS).map(str::to_string));

    let mut record = LogRecord::new(id, index, timestamp, level, message, attributes);
    record.timestamp_defaulted = defaulted;
    record
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Id for records whose source carries none.
pub fn synthesized_id(position: usize) -> String {
    format!("log-{}", position)
}
