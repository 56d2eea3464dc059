use std::borrow::Borrow;

use serde::Serialize;

use super::bucket::{mean, percentage};
use super::status::StatusCount;
use crate::parser::LogRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_logs: usize,
    pub error_count: usize,
    pub error_rate: f64,
    /// 2xx share of records with a status code
    pub success_rate: f64,
    pub avg_duration: f64,
}

pub fn summarize<R: Borrow<LogRecord>>(records: &[R], statuses: &[StatusCount]) -> Summary {
    let total_logs = records.len();
    let error_count = records.iter().filter(|r| (*r).borrow().is_error()).count();
    let durations: Vec<f64> = records.iter().filter_map(|r| r.borrow().duration()).collect();
    let success_rate = statuses
        .iter()
        .find(|s| s.class == "2xx")
        .map(|s| s.percentage)
        .unwrap_or(0.0);

    Summary {
        total_logs,
        error_count,
        error_rate: percentage(error_count, total_logs),
        success_rate,
        avg_duration: mean(&durations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::status::status_distribution;
    use crate::parser::Attributes;
    use serde_json::json;

    fn record(level: &str, status: Option<u16>, duration: Option<f64>) -> LogRecord {
        let mut attributes = Attributes::new();
        if let Some(s) = status {
            attributes.insert("status_code".to_string(), json!(s));
        }
        if let Some(d) = duration {
            attributes.insert("duration_ms".to_string(), json!(d));
        }
        LogRecord::new(
            "x".to_string(),
            None,
            "2024-01-01T00:00:00Z".to_string(),
            Some(level.to_string()),
            None,
            attributes,
        )
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let records: Vec<LogRecord> = Vec::new();
        let summary = summarize(&records, &status_distribution(&records));
        assert_eq!(summary, Summary::default());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalLogs"], 0);
        assert_eq!(json["successRate"], 0.0);
        assert_eq!(json["avgDuration"], 0.0);
    }

    #[test]
    fn test_summary_values() {
        let records = vec![
            record("ERROR", Some(500), Some(300.0)),
            record("INFO", Some(200), Some(100.0)),
            record("INFO", Some(200), None),
            record("CRITICAL", None, None),
        ];
        let summary = summarize(&records, &status_distribution(&records));

        assert_eq!(summary.total_logs, 4);
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.error_rate, 50.0);
        assert_eq!(summary.success_rate, 66.7);
        assert_eq!(summary.avg_duration, 200.0);
    }

    #[test]
    fn test_summary_over_borrowed_records() {
        let records = vec![record("ERROR", None, Some(10.0)), record("INFO", None, None)];
        let visible: Vec<&LogRecord> = records.iter().collect();
        let summary = summarize(&visible, &status_distribution(&visible));

        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.error_rate, 50.0);
        assert_eq!(summary.avg_duration, 10.0);
    }

    #[test]
    fn test_no_status_data_means_zero_success() {
        let records = vec![record("INFO", None, None)];
        let summary = summarize(&records, &status_distribution(&records));
        assert_eq!(summary.success_rate, 0.0);
    }
}
