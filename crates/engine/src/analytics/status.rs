use std::borrow::Borrow;

use serde::Serialize;

use super::bucket::percentage;
use crate::parser::LogRecord;

const STATUS_CLASSES: [&str; 4] = ["2xx", "3xx", "4xx", "5xx"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub class: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Records per HTTP status class. Codes outside 200..=599 are ignored,
/// empty classes are omitted and percentages are over the present classes.
pub fn status_distribution<R: Borrow<LogRecord>>(records: &[R]) -> Vec<StatusCount> {
    let mut counts = [0usize; 4];
    for code in records.iter().filter_map(|r| r.borrow().status_code()) {
        if (200..600).contains(&code) {
            counts[(code / 100 - 2) as usize] += 1;
        }
    }

    let total: usize = counts.iter().sum();
    STATUS_CLASSES
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(class, count)| StatusCount {
            class: *class,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}
