//! Plain-text lines: timestamp and level are sniffed from the text, the
//! whole line becomes the message.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::parser::model::{Attributes, LogRecord};

/// Attribute key holding the verbatim line.
pub const RAW_FIELD: &str = "raw";

/// Level keywords recognised inside free text (matched as whole words).
pub const LEVEL_KEYWORDS: &[&str] = &[
    "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "FATAL", "TRACE", "CRITICAL",
];

/// Build a record from one text line.
pub fn parse_line(line: &str, id: String, ingested_at: DateTime<Utc>) -> LogRecord {
    let found = extract_timestamp(line).map(str::to_string);
    let defaulted = found.is_none();
    let timestamp = found.unwrap_or_else(|| ingested_at.to_rfc3339());
    let level = extract_level(line);

    let mut attributes = Attributes::new();
    attributes.insert(RAW_FIELD.to_string(), Value::String(line.to_string()));

    let mut record = LogRecord::new(
        id,
        None,
        timestamp,
        level,
        Some(line.to_string()),
        attributes,
    );
    record.timestamp_defaulted = defaulted;
    record
}

/// Leftmost `YYYY-MM-DD[T ]HH:MM:SS[.fff][Z|±HH[:]MM]` in `line`.
pub fn extract_timestamp(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    (0..bytes.len())
        .filter(|&i| bytes[i].is_ascii_digit())
        .find_map(|start| match_timestamp_at(bytes, start).map(|end| &line[start..end]))
}

/// First whole word that is a level keyword (case-insensitive), upper-cased.
pub fn extract_level(line: &str) -> Option<String> {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|word| LEVEL_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)))
        .map(|word| word.to_ascii_uppercase())
}

fn match_timestamp_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    pos = digits(bytes, pos, 4)?;
    pos = literal(bytes, pos, b'-')?;
    pos = digits(bytes, pos, 2)?;
    pos = literal(bytes, pos, b'-')?;
    pos = digits(bytes, pos, 2)?;
    pos = match bytes.get(pos) {
        Some(b'T') | Some(b' ') => pos + 1,
        _ => return None,
    };
    pos = digits(bytes, pos, 2)?;
    pos = literal(bytes, pos, b':')?;
    pos = digits(bytes, pos, 2)?;
    pos = literal(bytes, pos, b':')?;
    pos = digits(bytes, pos, 2)?;

    // Optional fraction
    if matches!(bytes.get(pos), Some(b'.') | Some(b',')) {
        let frac_end = run_of_digits(bytes, pos + 1);
        if frac_end > pos + 1 {
            pos = frac_end;
        }
    }

    // Optional zone
    match bytes.get(pos) {
        Some(b'Z') => pos += 1,
        Some(b'+') | Some(b'-') => {
            if let Some(end) = match_offset(bytes, pos + 1) {
                pos = end;
            }
        }
        _ => {}
    }

    Some(pos)
}

fn match_offset(bytes: &[u8], pos: usize) -> Option<usize> {
    let pos = digits(bytes, pos, 2)?;
    let pos = if bytes.get(pos) == Some(&b':') { pos + 1 } else { pos };
    digits(bytes, pos, 2)
}

fn digits(bytes: &[u8], pos: usize, count: usize) -> Option<usize> {
    let end = pos + count;
    if end <= bytes.len() && bytes[pos..end].iter().all(u8::is_ascii_digit) {
        Some(end)
    } else {
        None
    }
}

fn literal(bytes: &[u8], pos: usize, expected: u8) -> Option<usize> {
    (bytes.get(pos) == Some(&expected)).then_some(pos + 1)
}

fn run_of_digits(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}
