//! Explicit controller over one loaded file and its search state.
//!
//! Every read (`filtered`, `analytics`, `search_error`) recomputes from the
//! current state; nothing is cached between calls.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::analytics::{analyze, AnalyticsReport};
use crate::filter::{highlight_query, FilterEngine, FilterError, SearchFilter, SearchQuery, TimeRange};
use crate::parser::{discover_columns, LoadError, LogRecord, Normalizer};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["json", "log", "txt", "ndjson"];

/// Extension gate for files offered to [`LogSession::load`]. Dispatch itself
/// never depends on the name.
pub fn is_supported_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct LogSession {
    normalizer: Normalizer,
    records: Arc<[LogRecord]>,
    columns: Vec<String>,
    filename: Option<String>,
    load_error: Option<LoadError>,
    query: SearchQuery,
}

impl Default for LogSession {
    fn default() -> Self {
        Self::with_normalizer(Normalizer::default())
    }
}

impl LogSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            records: Arc::from(Vec::new()),
            columns: Vec::new(),
            filename: None,
            load_error: None,
            query: SearchQuery::default(),
        }
    }

    /// Replace the loaded set with `content`. On failure the previous set is
    /// discarded and the error is kept for [`LogSession::load_error`].
    pub fn load(&mut self, content: &str, filename: &str) -> Result<usize, LoadError> {
        match self.normalizer.normalize(content, filename) {
            Ok(records) => {
                let count = records.len();
                self.columns = discover_columns(&records);
                self.records = records.into();
                self.filename = Some(filename.to_string());
                self.load_error = None;
                info!(filename, records = count, columns = self.columns.len(), "session loaded");
                Ok(count)
            }
            Err(e) => {
                self.records = Arc::from(Vec::new());
                self.columns.clear();
                self.filename = None;
                self.load_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Drop the loaded set and any load error. Search state is kept.
    pub fn clear(&mut self) {
        self.records = Arc::from(Vec::new());
        self.columns.clear();
        self.filename = None;
        self.load_error = None;
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Shared handle to the current set; stays valid across reloads.
    pub fn snapshot(&self) -> Arc<[LogRecord]> {
        Arc::clone(&self.records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query.text = text.into();
    }

    pub fn set_regex(&mut self, use_regex: bool) {
        self.query.use_regex = use_regex;
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.query.case_sensitive = case_sensitive;
    }

    /// Returns false when the same filter is already active.
    pub fn add_filter(&mut self, filter: SearchFilter) -> bool {
        let added = self.query.add_filter(filter);
        debug!(added, active = self.query.filters.len(), "quick filter");
        added
    }

    pub fn remove_filter(&mut self, filter: &SearchFilter) -> bool {
        self.query.remove_filter(filter)
    }

    pub fn clear_filters(&mut self) {
        self.query.filters.clear();
    }

    pub fn set_time_range(&mut self, time_range: TimeRange) {
        self.query.time_range = time_range;
    }

    /// Reset query text, modes, filters and time range.
    pub fn clear_all(&mut self) {
        self.query = SearchQuery::default();
    }

    pub fn filtered(&self) -> Vec<&LogRecord> {
        FilterEngine::new(&self.query).apply(&self.records)
    }

    /// Set while the query is an invalid regex; filtering then skips the
    /// query stage.
    pub fn search_error(&self) -> Option<FilterError> {
        FilterEngine::new(&self.query).regex_error().cloned()
    }

    /// Aggregates over the filtered set.
    pub fn analytics(&self) -> AnalyticsReport {
        analyze(&self.filtered())
    }

    /// HTML-escaped `text` with matches of the current query marked.
    pub fn highlight(&self, text: &str) -> String {
        highlight_query(text, &self.query)
    }
}
