//! Serialization of the visible record set to JSON or CSV.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::parser::{model::value_text, LogRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

pub fn export<R: Borrow<LogRecord>>(records: &[R], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(records),
        ExportFormat::Csv => to_csv(records),
    }
}

/// One flat object per record: attributes, overridden by the named fields.
pub fn flat_record(record: &LogRecord) -> Map<String, Value> {
    let mut object: Map<String, Value> = record
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    object.insert("id".to_string(), Value::String(record.id.clone()));
    object.insert("timestamp".to_string(), Value::String(record.timestamp.clone()));
    let optional = [
        ("index", &record.index),
        ("level", &record.level),
        ("message", &record.message),
    ];
    for (key, value) in optional {
        if let Some(v) = value {
            object.insert(key.to_string(), Value::String(v.clone()));
        }
    }
    object
}

/// Pretty-printed JSON array of flat records.
pub fn to_json<R: Borrow<LogRecord>>(records: &[R]) -> Result<String, ExportError> {
    let rows: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(flat_record(r.borrow())))
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// CSV with the alphabetically sorted union of keys as header.
///
/// Missing values are empty cells and fields are quoted only when
/// needed. Rows are joined with `\n` and an empty set exports as an
/// empty string.
pub fn to_csv<R: Borrow<LogRecord>>(records: &[R]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let rows: Vec<Map<String, Value>> = records.iter().map(|r| flat_record(r.borrow())).collect();
    let header: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(
            header
                .iter()
                .map(|key| row.get(*key).map(|v| value_text(v).into_owned()).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    let mut out = String::from_utf8(bytes)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
