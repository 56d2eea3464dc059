use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::model::InputShape;

/// Counters for normalization runs.
///
/// All operations use `Ordering::Relaxed`; these are observability counters,
/// and `snapshot()` reads are not atomic across fields.
#[derive(Debug, Default)]
pub struct NormalizeMetrics {
    loads: AtomicU64,
    failed_loads: AtomicU64,
    json_array_records: AtomicU64,
    ndjson_records: AtomicU64,
    plain_text_records: AtomicU64,
    ndjson_fallbacks: AtomicU64,
    defaulted_timestamps: AtomicU64,
}

impl NormalizeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&self, success: bool) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_loads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_records(&self, shape: InputShape, count: u64) {
        let counter = match shape {
            InputShape::JsonArray => &self.json_array_records,
            InputShape::Ndjson => &self.ndjson_records,
            InputShape::PlainText => &self.plain_text_records,
        };
        counter.fetch_add(count, Ordering::Relaxed);
    }

    /// An NDJSON line that was kept as plain text.
    pub fn record_fallback(&self) {
        self.ndjson_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_defaulted_timestamps(&self, count: u64) {
        self.defaulted_timestamps.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            loads: self.loads.load(Ordering::Relaxed),
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            json_array_records: self.json_array_records.load(Ordering::Relaxed),
            ndjson_records: self.ndjson_records.load(Ordering::Relaxed),
            plain_text_records: self.plain_text_records.load(Ordering::Relaxed),
            ndjson_fallbacks: self.ndjson_fallbacks.load(Ordering::Relaxed),
            defaulted_timestamps: self.defaulted_timestamps.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.loads.store(0, Ordering::Relaxed);
        self.failed_loads.store(0, Ordering::Relaxed);
        self.json_array_records.store(0, Ordering::Relaxed);
        self.ndjson_records.store(0, Ordering::Relaxed);
        self.plain_text_records.store(0, Ordering::Relaxed);
        self.ndjson_fallbacks.store(0, Ordering::Relaxed);
        self.defaulted_timestamps.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`NormalizeMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub loads: u64,
    pub failed_loads: u64,
    pub json_array_records: u64,
    pub ndjson_records: u64,
    pub plain_text_records: u64,
    pub ndjson_fallbacks: u64,
    pub defaulted_timestamps: u64,
}

impl MetricsSnapshot {
    pub fn total_records(&self) -> u64 {
        self.json_array_records + self.ndjson_records + self.plain_text_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = NormalizeMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_load() {
        let metrics = NormalizeMetrics::new();
        metrics.record_load(true);
        metrics.record_load(false);

        let snap = metrics.snapshot();
        assert_eq!(snap.loads, 2);
        assert_eq!(snap.failed_loads, 1);
    }

    #[test]
    fn test_record_records_by_shape() {
        let metrics = NormalizeMetrics::new();
        metrics.record_records(InputShape::JsonArray, 3);
        metrics.record_records(InputShape::Ndjson, 2);
        metrics.record_records(InputShape::PlainText, 1);
        metrics.record_fallback();

        let snap = metrics.snapshot();
        assert_eq!(snap.json_array_records, 3);
        assert_eq!(snap.ndjson_records, 2);
        assert_eq!(snap.plain_text_records, 1);
        assert_eq!(snap.ndjson_fallbacks, 1);
        assert_eq!(snap.total_records(), 6);
    }

    #[test]
    fn test_reset() {
        let metrics = NormalizeMetrics::new();
        metrics.record_load(false);
        metrics.record_defaulted_timestamps(4);
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = NormalizeMetrics::new();
        metrics.record_records(InputShape::Ndjson, 1);
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["ndjson_records"], 1);
    }
}
