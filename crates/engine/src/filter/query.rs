use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Exact string equality
    Equals,
    /// Case-insensitive substring
    Contains,
    NotEquals,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotEquals => "not_equals",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::Contains => "~",
            FilterOperator::NotEquals => "!=",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("filter `{0}` has no operator (expected FIELD=VALUE, FIELD~VALUE or FIELD!=VALUE)")]
    MissingOperator(String),

    #[error("filter `{0}` has an empty field name")]
    EmptyField(String),
}

/// A single field/operator/value predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilter {
    pub field: String,
    pub value: String,
    pub operator: FilterOperator,
}

impl SearchFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, value, FilterOperator::Equals)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, value, FilterOperator::Contains)
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, value, FilterOperator::NotEquals)
    }

    /// Compare a field's string form. A missing field compares as "".
    pub fn matches_text(&self, text: &str) -> bool {
        match self.operator {
            FilterOperator::Equals => text == self.value,
            FilterOperator::NotEquals => text != self.value,
            FilterOperator::Contains => text.to_lowercase().contains(&self.value.to_lowercase()),
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator.symbol(), self.value)
    }
}

/// Parses `FIELD=VALUE`, `FIELD~VALUE` or `FIELD!=VALUE`. The leftmost
/// operator splits field from value.
impl FromStr for SearchFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, operator, width) = s
            .char_indices()
            .find_map(|(i, c)| match c {
                '!' if s[i..].starts_with("!=") => Some((i, FilterOperator::NotEquals, 2)),
                '~' => Some((i, FilterOperator::Contains, 1)),
                '=' => Some((i, FilterOperator::Equals, 1)),
                _ => None,
            })
            .ok_or_else(|| FilterParseError::MissingOperator(s.to_string()))?;

        let field = s[..at].trim();
        if field.is_empty() {
            return Err(FilterParseError::EmptyField(s.to_string()));
        }

        Ok(Self::new(field, &s[at + width..], operator))
    }
}

/// Inclusive bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// An unparsable instant is outside every bounded range.
    pub fn contains(&self, instant: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(t) = instant else {
            return false;
        };
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t <= e)
    }
}

/// Everything that narrows the visible record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub use_regex: bool,
    pub case_sensitive: bool,
    pub filters: Vec<SearchFilter>,
    pub time_range: TimeRange,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn regex(mut self, use_regex: bool) -> Self {
        self.use_regex = use_regex;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.add_filter(filter);
        self
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    /// Query text with surrounding whitespace removed; empty means no query stage.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Returns false when an identical filter is already present.
    pub fn add_filter(&mut self, filter: SearchFilter) -> bool {
        if self.filters.contains(&filter) {
            return false;
        }
        self.filters.push(filter);
        true
    }

    pub fn remove_filter(&mut self, filter: &SearchFilter) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f != filter);
        self.filters.len() != before
    }

    /// No query text, filters or time bounds.
    pub fn is_empty(&self) -> bool {
        self.trimmed_text().is_empty() && self.filters.is_empty() && self.time_range.is_unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            "http.status_code=404".parse::<SearchFilter>().unwrap(),
            SearchFilter::equals("http.status_code", "404")
        );
        assert_eq!(
            "message~timeout".parse::<SearchFilter>().unwrap(),
            SearchFilter::contains("message", "timeout")
        );
        assert_eq!(
            "level!=DEBUG".parse::<SearchFilter>().unwrap(),
            SearchFilter::not_equals("level", "DEBUG")
        );
    }

    #[test]
    fn test_parse_leftmost_operator_wins() {
        let filter: SearchFilter = "query=a=b".parse().unwrap();
        assert_eq!(filter.field, "query");
        assert_eq!(filter.value, "a=b");

        let filter: SearchFilter = "path~x!=y".parse().unwrap();
        assert_eq!(filter.operator, FilterOperator::Contains);
        assert_eq!(filter.value, "x!=y");
    }

    #[test]
    fn test_parse_empty_value_allowed() {
        let filter: SearchFilter = "index=".parse().unwrap();
        assert_eq!(filter.value, "");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "level".parse::<SearchFilter>(),
            Err(FilterParseError::MissingOperator("level".to_string()))
        );
        assert_eq!(
            "=x".parse::<SearchFilter>(),
            Err(FilterParseError::EmptyField("=x".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let filter = SearchFilter::not_equals("level", "INFO");
        assert_eq!(filter.to_string(), "level!=INFO");
        assert_eq!(filter.to_string().parse::<SearchFilter>().unwrap(), filter);
    }

    #[test]
    fn test_matches_text() {
        assert!(SearchFilter::equals("f", "404").matches_text("404"));
        assert!(!SearchFilter::equals("f", "404").matches_text("4040"));
        assert!(SearchFilter::contains("f", "TIME").matches_text("read timeout"));
        assert!(SearchFilter::not_equals("f", "a").matches_text(""));
    }

    #[test]
    fn test_add_filter_deduplicates() {
        let mut query = SearchQuery::default();
        assert!(query.add_filter(SearchFilter::equals("level", "ERROR")));
        assert!(!query.add_filter(SearchFilter::equals("level", "ERROR")));
        assert!(query.add_filter(SearchFilter::not_equals("level", "ERROR")));
        assert_eq!(query.filters.len(), 2);

        assert!(query.remove_filter(&SearchFilter::equals("level", "ERROR")));
        assert!(!query.remove_filter(&SearchFilter::equals("level", "ERROR")));
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn test_time_range_inclusive() {
        let range = TimeRange::new(Some(at(1)), Some(at(3)));
        assert!(range.contains(Some(at(1))));
        assert!(range.contains(Some(at(3))));
        assert!(!range.contains(Some(at(4))));
        assert!(!range.contains(None));
    }

    #[test]
    fn test_time_range_open_ended() {
        assert!(TimeRange::new(Some(at(2)), None).contains(Some(at(23))));
        assert!(!TimeRange::new(None, Some(at(2))).contains(Some(at(3))));
        assert!(TimeRange::default().contains(None));
    }

    #[test]
    fn test_is_empty_ignores_whitespace_text() {
        assert!(SearchQuery::new("   ").is_empty());
        assert!(!SearchQuery::new("x").is_empty());
        assert!(!SearchQuery::default()
            .with_time_range(TimeRange::new(Some(at(0)), None))
            .is_empty());
    }

    #[test]
    fn test_operator_serializes_snake_case() {
        let json = serde_json::to_string(&FilterOperator::NotEquals).unwrap();
        assert_eq!(json, "\"not_equals\"");
    }
}
