use std::borrow::Borrow;
use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use super::bucket::percentage;
use crate::parser::LogRecord;

pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// Severity order and display colour.
pub const LEVEL_PRIORITY: &[(&str, &str)] = &[
    ("ERROR", "#ef4444"),
    ("FATAL", "#dc2626"),
    ("CRITICAL", "#b91c1c"),
    ("WARN", "#f59e0b"),
    ("WARNING", "#f59e0b"),
    ("INFO", "#3b82f6"),
    ("DEBUG", "#6b7280"),
    ("TRACE", "#9ca3af"),
    (UNKNOWN_LEVEL, "#d1d5db"),
];

const OTHER_LEVEL_COLOR: &str = "#94a3b8";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    pub level: String,
    pub count: usize,
    pub percentage: f64,
    pub color: &'static str,
}

/// Rank and colour for a level; levels outside the table sort last.
fn level_rank(level: &str) -> (usize, &'static str) {
    LEVEL_PRIORITY
        .iter()
        .position(|(name, _)| *name == level)
        .map(|i| (i, LEVEL_PRIORITY[i].1))
        .unwrap_or((LEVEL_PRIORITY.len(), OTHER_LEVEL_COLOR))
}

/// Records per upper-cased level, in severity order then by descending count.
pub fn level_distribution<R: Borrow<LogRecord>>(records: &[R]) -> Vec<LevelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let level = record
            .borrow()
            .level
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| UNKNOWN_LEVEL.to_string());
        *counts.entry(level).or_default() += 1;
    }

    let total = records.len();
    let mut levels: Vec<LevelCount> = counts
        .into_iter()
        .map(|(level, count)| LevelCount {
            color: level_rank(&level).1,
            percentage: percentage(count, total),
            level,
            count,
        })
        .collect();

    levels.sort_by(|a, b| {
        let key_a = (level_rank(&a.level).0, Reverse(a.count), &a.level);
        let key_b = (level_rank(&b.level).0, Reverse(b.count), &b.level);
        key_a.cmp(&key_b)
    });
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Attributes;

    fn with_level(level: Option<&str>) -> LogRecord {
        LogRecord::new(
            "x".to_string(),
            None,
            "2024-01-01T00:00:00Z".to_string(),
            level.map(str::to_string),
            None,
            Attributes::new(),
        )
    }

    #[test]
    fn test_priority_then_count() {
        let records = vec![
            with_level(Some("ERROR")),
            with_level(Some("INFO")),
            with_level(Some("INFO")),
        ];
        let levels = level_distribution(&records);

        assert_eq!(levels.len(), 2);
        assert_eq!((levels[0].level.as_str(), levels[0].count, levels[0].percentage), ("ERROR", 1, 33.3));
        assert_eq!((levels[1].level.as_str(), levels[1].count, levels[1].percentage), ("INFO", 2, 66.7));
        assert_eq!(levels[0].color, "#ef4444");
    }

    #[test]
    fn test_missing_level_is_unknown() {
        let records = vec![with_level(None), with_level(Some("debug"))];
        let levels = level_distribution(&records);
        assert_eq!(levels[0].level, "DEBUG");
        assert_eq!(levels[1].level, UNKNOWN_LEVEL);
    }

    #[test]
    fn test_unlisted_levels_sort_after_unknown() {
        let records = vec![
            with_level(Some("NOTICE")),
            with_level(Some("AUDIT")),
            with_level(Some("AUDIT")),
            with_level(None),
        ];
        let names: Vec<String> = level_distribution(&records).into_iter().map(|l| l.level).collect();
        assert_eq!(names, vec!["UNKNOWN", "AUDIT", "NOTICE"]);
    }

    #[test]
    fn test_empty() {
        let records: Vec<LogRecord> = Vec::new();
        assert!(level_distribution(&records).is_empty());
    }
}
