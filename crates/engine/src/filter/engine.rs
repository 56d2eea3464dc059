use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use super::query::{SearchFilter, SearchQuery, TimeRange};
use crate::parser::LogRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
}

/// Compile the query matcher. Without `use_regex` the text matches
/// literally.
pub fn build_matcher(
    text: &str,
    use_regex: bool,
    case_sensitive: bool,
) -> Result<RegexMatcher, FilterError> {
    RegexMatcherBuilder::new()
        .case_insensitive(!case_sensitive)
        .multi_line(false)
        .fixed_strings(!use_regex)
        .build(text)
        .map_err(|e| FilterError::InvalidRegex(e.to_string()))
}

/// Compiled form of a [`SearchQuery`].
///
/// Stages run in order and each narrows the previous stage's output:
/// time range, quick filters (all must pass), then the query text
/// (any field may match). An invalid regex disables the query stage
/// and is reported through [`FilterEngine::regex_error`].
pub struct FilterEngine {
    time_range: TimeRange,
    filters: Vec<SearchFilter>,
    matcher: Option<RegexMatcher>,
    regex_error: Option<FilterError>,
}

impl FilterEngine {
    pub fn new(query: &SearchQuery) -> Self {
        let text = query.trimmed_text();
        let (matcher, regex_error) = if text.is_empty() {
            (None, None)
        } else {
            match build_matcher(text, query.use_regex, query.case_sensitive) {
                Ok(m) => (Some(m), None),
                Err(e) => {
                    warn!(pattern = text, error = %e, "query stage skipped");
                    (None, Some(e))
                }
            }
        };

        Self {
            time_range: query.time_range,
            filters: query.filters.clone(),
            matcher,
            regex_error,
        }
    }

    pub fn regex_error(&self) -> Option<&FilterError> {
        self.regex_error.as_ref()
    }

    pub fn apply<'r>(&self, records: &'r [LogRecord]) -> Vec<&'r LogRecord> {
        let mut visible: Vec<&LogRecord> = records
            .iter()
            .filter(|r| self.time_range.contains(r.instant))
            .collect();
        let after_time = visible.len();

        if !self.filters.is_empty() {
            visible.retain(|r| self.passes_filters(r));
        }
        let after_filters = visible.len();

        if let Some(matcher) = &self.matcher {
            visible.retain(|r| matches_any_field(matcher, r));
        }

        debug!(
            total = records.len(),
            after_time,
            after_filters,
            visible = visible.len(),
            "filter applied"
        );
        visible
    }

    fn passes_filters(&self, record: &LogRecord) -> bool {
        self.filters.iter().all(|f| {
            let text = record.field_text(&f.field).unwrap_or_default();
            f.matches_text(&text)
        })
    }
}

fn matches_any_field(matcher: &RegexMatcher, record: &LogRecord) -> bool {
    record
        .field_texts()
        .any(|text| matcher.is_match(text.as_bytes()).unwrap_or(false))
}

/// Compile `query` and apply it once.
pub fn apply<'r>(records: &'r [LogRecord], query: &SearchQuery) -> Vec<&'r LogRecord> {
    FilterEngine::new(query).apply(records)
}
