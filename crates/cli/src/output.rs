//! Plain-text rendering for terminal use.

use std::fmt::{self, Write};

use loglens_engine::analytics::AnalyticsReport;
use loglens_engine::filter::highlight_query;
use loglens_engine::parser::MetricsSnapshot;
use loglens_engine::{LogRecord, SearchQuery};

const BAR_WIDTH: usize = 40;

/// Tab-separated table with a header row. Tabs and newlines inside cells
/// are flattened to spaces so every record stays on one line.
pub fn records_table(
    records: &[&LogRecord],
    columns: &[String],
    highlight: Option<&SearchQuery>,
) -> String {
    let mut out = columns.join("\t");
    out.push('\n');

    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                let text = record
                    .field_text(column)
                    .map(|t| t.replace(['\t', '\n', '\r'], " "))
                    .unwrap_or_default();
                match highlight {
                    Some(query) => highlight_query(&text, query),
                    None => text,
                }
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

pub fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

pub fn report_text(report: &AnalyticsReport, load: &MetricsSnapshot) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let s = &report.summary;

    writeln!(out, "Summary")?;
    writeln!(out, "  total       {}", s.total_logs)?;
    writeln!(out, "  errors      {} ({:.1}%)", s.error_count, s.error_rate)?;
    writeln!(out, "  success     {:.1}%", s.success_rate)?;
    writeln!(out, "  avg time    {:.2}", s.avg_duration)?;
    writeln!(
        out,
        "  loaded      {} (text fallbacks {}, defaulted timestamps {})",
        load.total_records(),
        load.ndjson_fallbacks,
        load.defaulted_timestamps
    )?;

    if !report.levels.is_empty() {
        writeln!(out, "\nLevels")?;
        for level in &report.levels {
            writeln!(
                out,
                "  {:<9} {:>7} {:>6.1}%  {}",
                level.level, level.count, level.percentage, level.color
            )?;
        }
    }

    if !report.statuses.is_empty() {
        writeln!(out, "\nStatus codes")?;
        for status in &report.statuses {
            writeln!(out, "  {:<9} {:>7} {:>6.1}%", status.class, status.count, status.percentage)?;
        }
    }

    if !report.timeline.is_empty() {
        writeln!(out, "\nTimeline")?;
        for bucket in &report.timeline {
            writeln!(
                out,
                "  {:<16} {:>7} {}",
                bucket.label,
                bucket.count,
                bar(bucket.count, bucket.max_count_in_series)
            )?;
        }
    }

    if !report.duration_evolution.is_empty() {
        writeln!(out, "\nDuration          avg       min       max       p95")?;
        for p in &report.duration_evolution {
            writeln!(
                out,
                "  {:<10} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                p.label, p.avg, p.min, p.max, p.p95
            )?;
        }
    }

    if !report.error_rate_evolution.is_empty() {
        writeln!(out, "\nError rate")?;
        for b in &report.error_rate_evolution {
            writeln!(
                out,
                "  {:<10} {:>6.1}%  ({}/{})",
                b.label, b.error_rate, b.error_count, b.total_count
            )?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loglens_engine::{analyze, normalize, Normalizer};

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1000).len(), 1);
    }

    #[test]
    fn test_records_table() {
        let records = normalize("{\"msg\":\"a\\tb\",\"env\":\"prod\"}", "x.ndjson").unwrap();
        let refs: Vec<&LogRecord> = records.iter().collect();
        let columns = vec!["message".to_string(), "env".to_string(), "missing".to_string()];

        let table = records_table(&refs, &columns, None);
        assert_eq!(table, "message\tenv\tmissing\na b\tprod\t\n");
    }

    #[test]
    fn test_records_table_highlight() {
        let records = normalize("{\"msg\":\"db <timeout>\"}", "x.ndjson").unwrap();
        let refs: Vec<&LogRecord> = records.iter().collect();
        let query = SearchQuery::new("timeout");

        let table = records_table(&refs, &["message".to_string()], Some(&query));
        assert!(table.contains("db &lt;<mark>timeout</mark>&gt;"));
    }

    #[test]
    fn test_report_text_sections() {
        let normalizer = Normalizer::new().with_ingest_time(Utc.with_ymd_and_hms(2024, 1, 1, 10, 2, 0).unwrap());
        let records = normalizer
            .normalize(
                "{\"time\":\"2024-01-01T10:00:00Z\",\"level\":\"error\",\"status\":500}\n{\"time\":\"2024-01-01T10:01:00Z\",\"level\":\"info\",\"status\":200}\nplain",
                "x.ndjson",
            )
            .unwrap();
        let text = report_text(&analyze(&records), &normalizer.metrics().snapshot()).unwrap();

        assert!(text.contains("total       3"));
        assert!(text.contains("loaded      3 (text fallbacks 1, defaulted timestamps 1)"));
        assert!(text.contains("Levels"));
        assert!(text.contains("Status codes"));
        assert!(text.contains("Timeline"));
        assert!(text.contains("Error rate"));
        assert!(!text.contains("Duration"));
    }
}
