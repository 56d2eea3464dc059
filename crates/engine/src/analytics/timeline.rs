use std::borrow::Borrow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::bucket::{bucket_start, label, DAY, HOUR, MINUTE, WEEK};
use crate::parser::LogRecord;

pub const MAX_TIMELINE_POINTS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    pub time: DateTime<Utc>,
    pub label: String,
    pub count: usize,
    pub max_count_in_series: usize,
}

/// Bucket width in seconds and label format for a time range.
pub fn timeline_width(range_secs: i64) -> (i64, &'static str) {
    if range_secs < HOUR {
        (MINUTE, "%H:%M")
    } else if range_secs < DAY {
        (15 * MINUTE, "%H:%M")
    } else if range_secs < WEEK {
        (HOUR, "%m-%d %H:%M")
    } else {
        (DAY, "%Y-%m-%d")
    }
}

/// Record counts over time.
///
/// Every bucket between the first and last timestamp is present, empty
/// ones included. Series longer than [`MAX_TIMELINE_POINTS`] keep every
/// Nth bucket with `N = ceil(len / MAX_TIMELINE_POINTS)`. Records without
/// a parsable timestamp are ignored.
pub fn timeline<R: Borrow<LogRecord>>(records: &[R]) -> Vec<TimelineBucket> {
    let times: Vec<i64> = records
        .iter()
        .filter_map(|r| r.borrow().instant)
        .map(|t| t.timestamp())
        .collect();

    let (Some(&min), Some(&max)) = (times.iter().min(), times.iter().max()) else {
        return Vec::new();
    };

    let (width, format) = timeline_width(max - min);
    let first = bucket_start(min, width);
    let last = bucket_start(max, width);
    let len = ((last - first) / width) as usize + 1;

    let stride = if len > MAX_TIMELINE_POINTS {
        len.div_ceil(MAX_TIMELINE_POINTS)
    } else {
        1
    };

    // Only the kept buckets get a counter.
    let mut counts = vec![0usize; len.div_ceil(stride)];
    for t in &times {
        let index = ((bucket_start(*t, width) - first) / width) as usize;
        if index % stride == 0 {
            counts[index / stride] += 1;
        }
    }

    let kept: Vec<(i64, usize)> = counts
        .into_iter()
        .enumerate()
        .map(|(slot, count)| (first + (slot * stride) as i64 * width, count))
        .collect();
    let max_count_in_series = kept.iter().map(|(_, c)| *c).max().unwrap_or(0);

    kept.into_iter()
        .filter_map(|(secs, count)| {
            Some(TimelineBucket {
                time: DateTime::<Utc>::from_timestamp(secs, 0)?,
                label: label(secs, format),
                count,
                max_count_in_series,
            })
        })
        .collect()
}
