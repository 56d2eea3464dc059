use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::fields;

/// Flattened attribute mapping: dot-path key → scalar or array value.
pub type Attributes = BTreeMap<String, Value>;

/// Names of the explicit record fields, in column order.
pub const NAMED_FIELDS: [&str; 5] = ["timestamp", "level", "message", "id", "index"];

/// Shape of a loaded file, decided from its first non-blank character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    /// A single JSON array; every element is one record
    JsonArray,
    /// Newline-delimited JSON objects
    Ndjson,
    /// One record per text line
    PlainText,
}

impl InputShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputShape::JsonArray => "json_array",
            InputShape::Ndjson => "ndjson",
            InputShape::PlainText => "plain_text",
        }
    }
}

/// Whole-file failures. The previously loaded set is discarded when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Expected a JSON array of log records")]
    NotAnArray,
}

/// One normalized log record.
///
/// Records are produced once per ingested line or array element and are
/// read-only afterwards; a reload replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unique within a loaded set (synthesized when the source has none)
    pub id: String,

    /// Origin label, carried through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Timestamp text as found in the source, or the ingestion instant
    pub timestamp: String,

    /// `timestamp` parsed once at normalization time
    #[serde(skip)]
    pub instant: Option<DateTime<Utc>>,

    /// Set when the source had no timestamp and the ingestion instant was used
    #[serde(skip)]
    pub timestamp_defaulted: bool,

    /// Upper-cased severity label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Every source field, flattened to dot-paths
    #[serde(default)]
    pub attributes: Attributes,
}

impl LogRecord {
    /// Build a record, parsing `timestamp` into an instant.
    pub fn new(
        id: String,
        index: Option<String>,
        timestamp: String,
        level: Option<String>,
        message: Option<String>,
        attributes: Attributes,
    ) -> Self {
        let instant = fields::parse_timestamp(&timestamp);
        Self {
            id,
            index,
            timestamp,
            instant,
            timestamp_defaulted: false,
            level,
            message,
            attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String form of a named field or attribute. `None` when absent.
    pub fn field_text(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "index" => self.index.as_deref().map(Cow::Borrowed),
            "timestamp" => Some(Cow::Borrowed(self.timestamp.as_str())),
            "level" => self.level.as_deref().map(Cow::Borrowed),
            "message" => self.message.as_deref().map(Cow::Borrowed),
            _ => self.attributes.get(name).map(value_text),
        }
    }

    /// String forms of every field value: named fields first, then attributes.
    pub fn field_texts(&self) -> impl Iterator<Item = Cow<'_, str>> {
        let named = [
            Some(self.id.as_str()),
            self.index.as_deref(),
            Some(self.timestamp.as_str()),
            self.level.as_deref(),
            self.message.as_deref(),
        ];
        named
            .into_iter()
            .flatten()
            .map(Cow::Borrowed)
            .chain(self.attributes.values().map(value_text))
    }

    /// HTTP status code from the well-known status fields.
    pub fn status_code(&self) -> Option<u16> {
        fields::first_number(&self.attributes, fields::STATUS_FIELDS)
            .filter(|n| n.fract() == 0.0 && (0.0..=999.0).contains(n))
            .map(|n| n as u16)
    }

    /// Request duration from the well-known duration fields.
    pub fn duration(&self) -> Option<f64> {
        fields::first_number(&self.attributes, fields::DURATION_FIELDS)
    }

    /// ERROR, FATAL and CRITICAL count as errors.
    pub fn is_error(&self) -> bool {
        matches!(
            self.level.as_deref(),
            Some("ERROR") | Some("FATAL") | Some("CRITICAL")
        )
    }
}

/// Stringify a JSON value the way field comparisons see it:
/// strings verbatim, objects and arrays as compact JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}
