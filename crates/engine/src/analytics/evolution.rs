use std::borrow::Borrow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::bucket::{bucket_start, label, mean, nearest_rank, percentage, HOUR, MINUTE};
use crate::parser::LogRecord;

const EVOLUTION_LABEL: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationPoint {
    pub time: DateTime<Utc>,
    pub label: String,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRateBucket {
    pub time: DateTime<Utc>,
    pub label: String,
    pub error_rate: f64,
    pub error_count: usize,
    pub total_count: usize,
}

/// 5 minutes under an hour of data, 15 minutes otherwise.
pub fn evolution_width(range_secs: i64) -> i64 {
    if range_secs < HOUR {
        5 * MINUTE
    } else {
        15 * MINUTE
    }
}

/// Group time-sorted `(secs, value)` points into occupied buckets.
/// Fewer than two points yield nothing.
fn group_points<T>(mut points: Vec<(i64, T)>) -> BTreeMap<i64, Vec<T>> {
    let mut grouped = BTreeMap::new();
    if points.len() < 2 {
        return grouped;
    }
    points.sort_by_key(|(t, _)| *t);

    let range = points[points.len() - 1].0 - points[0].0;
    let width = evolution_width(range);
    for (t, value) in points {
        grouped
            .entry(bucket_start(t, width))
            .or_insert_with(Vec::new)
            .push(value);
    }
    grouped
}

/// Average, min, max and p95 duration per bucket. Records missing a
/// timestamp or a duration are dropped.
pub fn duration_evolution<R: Borrow<LogRecord>>(records: &[R]) -> Vec<DurationPoint> {
    let points: Vec<(i64, f64)> = records
        .iter()
        .filter_map(|r| {
            let r = r.borrow();
            Some((r.instant?.timestamp(), r.duration()?))
        })
        .collect();

    group_points(points)
        .into_iter()
        .filter_map(|(secs, mut values)| {
            values.sort_by(f64::total_cmp);
            Some(DurationPoint {
                time: DateTime::<Utc>::from_timestamp(secs, 0)?,
                label: label(secs, EVOLUTION_LABEL),
                avg: mean(&values),
                max: *values.last()?,
                min: *values.first()?,
                p95: nearest_rank(&values, 0.95),
            })
        })
        .collect()
}

/// Share of ERROR, FATAL and CRITICAL records per bucket.
pub fn error_rate_evolution<R: Borrow<LogRecord>>(records: &[R]) -> Vec<ErrorRateBucket> {
    let points: Vec<(i64, bool)> = records
        .iter()
        .filter_map(|r| {
            let r = r.borrow();
            Some((r.instant?.timestamp(), r.is_error()))
        })
        .collect();

    group_points(points)
        .into_iter()
        .filter_map(|(secs, flags)| {
            let error_count = flags.iter().filter(|e| **e).count();
            Some(ErrorRateBucket {
                time: DateTime::<Utc>::from_timestamp(secs, 0)?,
                label: label(secs, EVOLUTION_LABEL),
                error_rate: percentage(error_count, flags.len()),
                error_count,
                total_count: flags.len(),
            })
        })
        .collect()
}
