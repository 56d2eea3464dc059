//! Record normalization
//!
//! Turns raw file content into an ordered sequence of uniform
//! [`LogRecord`]s without assuming any fixed schema.
//!
//! # Architecture
//!
//! - `detector.rs`: content-shape dispatch (JSON array / NDJSON / plain text)
//! - `formats/`: per-shape record builders
//! - `flatten.rs`: nested-object flattening to dot-paths
//! - `fields.rs`: ordered field lookup tables and timestamp parsing
//! - `columns.rs`: column discovery across a record set
//! - `metrics.rs`: normalization counters
//!
//! # Failure model
//!
//! - A file that looks like a JSON array but is not one fails the whole load.
//! - An NDJSON line that does not parse becomes a plain-text record.

pub mod columns;
pub mod detector;
pub mod fields;
pub mod flatten;
pub mod formats;
pub mod metrics;
pub mod model;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub use columns::discover_columns;
pub use detector::detect_shape;
pub use metrics::{MetricsSnapshot, NormalizeMetrics};
pub use model::{Attributes, InputShape, LoadError, LogRecord, NAMED_FIELDS};

use formats::LineOutcome;

/// Stateless apart from its counters; one instance can serve many loads.
#[derive(Debug, Default)]
pub struct Normalizer {
    ingested_at: Option<DateTime<Utc>>,
    metrics: NormalizeMetrics,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the instant used for records without a detectable timestamp.
    /// Without it, the wall clock at load time is used.
    pub fn with_ingest_time(mut self, ingested_at: DateTime<Utc>) -> Self {
        self.ingested_at = Some(ingested_at);
        self
    }

    pub fn metrics(&self) -> &NormalizeMetrics {
        &self.metrics
    }

    /// Normalize `content`. `filename` is only used for diagnostics.
    pub fn normalize(&self, content: &str, filename: &str) -> Result<Vec<LogRecord>, LoadError> {
        let ingested_at = self.ingested_at.unwrap_or_else(Utc::now);
        let shape = detect_shape(content);
        debug!(filename, shape = shape.as_str(), bytes = content.len(), "normalizing");

        let result = match shape {
            InputShape::JsonArray => self.normalize_array(content, ingested_at),
            InputShape::Ndjson => Ok(self.normalize_ndjson(content, ingested_at)),
            InputShape::PlainText => Ok(normalize_plain(content, ingested_at)),
        };

        match &result {
            Ok(records) => {
                self.metrics.record_load(true);
                self.metrics.record_records(shape, records.len() as u64);
                let defaulted = records
                    .iter()
                    .filter(|r| r.timestamp_defaulted)
                    .count();
                self.metrics.record_defaulted_timestamps(defaulted as u64);
                info!(filename, shape = shape.as_str(), records = records.len(), "loaded");
            }
            Err(e) => {
                self.metrics.record_load(false);
                warn!(filename, error = %e, "load failed");
            }
        }

        result
    }

    fn normalize_array(
        &self,
        content: &str,
        ingested_at: DateTime<Utc>,
    ) -> Result<Vec<LogRecord>, LoadError> {
        let items = formats::parse_array(content)?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(position, item)| formats::normalize_element(item, position, ingested_at))
            .collect())
    }

    fn normalize_ndjson(&self, content: &str, ingested_at: DateTime<Utc>) -> Vec<LogRecord> {
        non_blank_lines(content)
            .enumerate()
            .map(|(position, line)| {
                match formats::parse_ndjson_line(line, position, ingested_at) {
                    LineOutcome::Structured(record) => record,
                    LineOutcome::Fallback(record) => {
                        self.metrics.record_fallback();
                        debug!(position, "ndjson line kept as plain text");
                        record
                    }
                }
            })
            .collect()
    }
}

/// Normalize with a fresh [`Normalizer`] and the current time as ingestion instant.
pub fn normalize(content: &str, filename: &str) -> Result<Vec<LogRecord>, LoadError> {
    Normalizer::new().normalize(content, filename)
}

fn normalize_plain(content: &str, ingested_at: DateTime<Utc>) -> Vec<LogRecord> {
    non_blank_lines(content)
        .enumerate()
        .map(|(position, line)| {
            formats::parse_line(line, formats::json::synthesized_id(position), ingested_at)
        })
        .collect()
}

/// Lines with any trailing `\r` removed; whitespace-only lines are skipped.
fn non_blank_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}
