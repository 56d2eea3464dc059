use std::borrow::Borrow;
use std::collections::BTreeSet;

use super::model::{LogRecord, NAMED_FIELDS};

/// Columns available across a record set.
///
/// `timestamp, level, message, id, index` always lead, in that order;
/// every other attribute key follows, sorted lexicographically. An empty
/// set has no columns.
pub fn discover_columns<R: Borrow<LogRecord>>(records: &[R]) -> Vec<String> {
    if records.is_empty() {
        return Vec::new();
    }

    let rest: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.borrow().attributes.keys().map(String::as_str))
        .filter(|key| !NAMED_FIELDS.contains(key))
        .collect();

    NAMED_FIELDS
        .iter()
        .copied()
        .chain(rest)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::model::Attributes;
    use serde_json::json;

    fn record(keys: &[&str]) -> LogRecord {
        let attributes: Attributes = keys.iter().map(|k| (k.to_string(), json!(1))).collect();
        LogRecord::new(
            "x".to_string(),
            None,
            "2024-01-01T00:00:00Z".to_string(),
            None,
            None,
            attributes,
        )
    }

    #[test]
    fn test_empty_set_has_no_columns() {
        let records: Vec<LogRecord> = Vec::new();
        assert!(discover_columns(&records).is_empty());
    }

    #[test]
    fn test_named_fields_lead_then_sorted_union() {
        let records = vec![
            record(&["zeta", "http.method", "level"]),
            record(&["alpha", "http.method", "message"]),
        ];
        let columns = discover_columns(&records);
        assert_eq!(
            columns,
            vec!["timestamp", "level", "message", "id", "index", "alpha", "http.method", "zeta"]
        );
    }

    #[test]
    fn test_works_over_references() {
        let owned = [record(&["b"]), record(&["a"])];
        let refs: Vec<&LogRecord> = owned.iter().collect();
        assert_eq!(discover_columns(&refs)[5..], ["a".to_string(), "b".to_string()]);
    }
}
