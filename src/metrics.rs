//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

/// Metric names, kept in one place so dashboards can rely on them
pub mod names {
    pub const PARTS_LOADED: &str = "digimv_parts_loaded_total";
    pub const PARTS_SKIPPED: &str = "digimv_parts_skipped_total";
    pub const ROWS_ASSEMBLED: &str = "digimv_rows_assembled_total";
    pub const RECORDS_RETAINED: &str = "digimv_records_retained_total";
    pub const RECORDS_DISCARDED: &str = "digimv_records_discarded_total";
    pub const CACHE_HITS: &str = "digimv_cache_hits_total";
    pub const CACHE_MISSES: &str = "digimv_cache_misses_total";
    pub const INGEST_DURATION: &str = "digimv_ingest_duration_seconds";
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_part_loaded() {
        ::metrics::counter!(names::PARTS_LOADED).increment(1);
    }

    pub fn record_part_skipped() {
        ::metrics::counter!(names::PARTS_SKIPPED).increment(1);
    }

    pub fn record_merge(assembled: usize, retained: usize, discarded: usize) {
        ::metrics::counter!(names::ROWS_ASSEMBLED).increment(assembled as u64);
        ::metrics::counter!(names::RECORDS_RETAINED).increment(retained as u64);
        ::metrics::counter!(names::RECORDS_DISCARDED).increment(discarded as u64);
    }

    pub fn record_cache(slot: &'static str, hit: bool) {
        if hit {
            ::metrics::counter!(names::CACHE_HITS, "slot" => slot).increment(1);
        } else {
            ::metrics::counter!(names::CACHE_MISSES, "slot" => slot).increment(1);
        }
    }

    pub fn record_ingest_duration(duration_secs: f64) {
        ::metrics::histogram!(names::INGEST_DURATION).record(duration_secs);
    }
}
