//! Aggregates over the visible record set
//!
//! Every function here is a pure, deterministic pass over its input and
//! accepts owned records or references (`&[LogRecord]` or `&[&LogRecord]`).

pub mod bucket;
pub mod evolution;
pub mod levels;
pub mod status;
pub mod summary;
pub mod timeline;

use std::borrow::Borrow;

use serde::Serialize;
use tracing::debug;

use crate::parser::LogRecord;

pub use evolution::{duration_evolution, error_rate_evolution, DurationPoint, ErrorRateBucket};
pub use levels::{level_distribution, LevelCount};
pub use status::{status_distribution, StatusCount};
pub use summary::{summarize, Summary};
pub use timeline::{timeline, TimelineBucket, MAX_TIMELINE_POINTS};

/// All aggregates for one record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub levels: Vec<LevelCount>,
    pub statuses: Vec<StatusCount>,
    pub timeline: Vec<TimelineBucket>,
    pub duration_evolution: Vec<DurationPoint>,
    pub error_rate_evolution: Vec<ErrorRateBucket>,
}

pub fn analyze<R: Borrow<LogRecord>>(records: &[R]) -> AnalyticsReport {
    let statuses = status_distribution(records);
    let report = AnalyticsReport {
        summary: summarize(records, &statuses),
        levels: level_distribution(records),
        statuses,
        timeline: timeline(records),
        duration_evolution: duration_evolution(records),
        error_rate_evolution: error_rate_evolution(records),
    };

    debug!(
        records = records.len(),
        levels = report.levels.len(),
        timeline_buckets = report.timeline.len(),
        "analytics computed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize;

    #[test]
    fn test_analyze_ndjson() {
        let content = [
            r#"{"time":"2024-01-01T10:00:00Z","level":"info","status":200,"duration":12}"#,
            r#"{"time":"2024-01-01T10:02:00Z","level":"error","status":503,"duration":900}"#,
            r#"{"time":"2024-01-01T10:04:00Z","level":"info","status":200,"duration":18}"#,
        ]
        .join("\n");
        let records = normalize(&content, "api.ndjson").unwrap();
        let report = analyze(&records);

        assert_eq!(report.summary.total_logs, 3);
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.summary.success_rate, 66.7);
        assert_eq!(report.levels[0].level, "ERROR");
        assert_eq!(report.statuses.len(), 2);
        assert_eq!(report.timeline.len(), 5);
        assert_eq!(report.duration_evolution.len(), 1);
        assert_eq!(report.duration_evolution[0].max, 900.0);
        assert_eq!(report.error_rate_evolution[0].error_count, 1);
    }

    #[test]
    fn test_analyze_over_references() {
        let records = normalize("ERROR a\nINFO b", "app.log").unwrap();
        let visible: Vec<&LogRecord> = records.iter().filter(|r| r.is_error()).collect();
        let report = analyze(&visible);
        assert_eq!(report.summary.total_logs, 1);
        assert_eq!(report.summary.error_rate, 100.0);
    }
}
