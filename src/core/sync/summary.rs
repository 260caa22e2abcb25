//! Sync run summary and reporting

use crate::domain::ids::TableName;
use crate::domain::DateRange;
use std::time::Duration;

/// Summary of a completed sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Extracted date range
    pub range: DateRange,

    /// Destination table
    pub table: TableName,

    /// DuckDB file the table lives in
    pub duckdb_file: String,

    /// Row count reported by the warehouse
    pub total_rows: u64,

    /// Rows written to the destination
    pub rows_loaded: u64,

    /// Number of batches consumed
    pub batch_count: u64,

    /// Wall time of the run
    pub duration: Duration,
}

impl SyncSummary {
    pub fn new(range: DateRange, table: TableName, duckdb_file: impl Into<String>) -> Self {
        Self {
            range,
            table,
            duckdb_file: duckdb_file.into(),
            total_rows: 0,
            rows_loaded: 0,
            batch_count: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Rows per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.rows_loaded as f64 / secs
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            start_date = %self.range.start_date(),
            end_date = %self.range.end_date(),
            table = %self.table,
            duckdb_file = %self.duckdb_file,
            total_rows = self.total_rows,
            rows_loaded = self.rows_loaded,
            batch_count = self.batch_count,
            duration_secs = self.duration.as_secs(),
            rows_per_sec = format!("{:.0}", self.throughput()),
            "Sync completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary() -> SyncSummary {
        SyncSummary::new(
            DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ),
            TableName::new("events_raw").unwrap(),
            "events.duckdb",
        )
    }

    #[test]
    fn test_new_summary_is_empty() {
        let summary = summary();
        assert_eq!(summary.rows_loaded, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert_eq!(summary.throughput(), 0.0);
    }

    #[test]
    fn test_throughput() {
        let mut summary = summary().with_duration(Duration::from_secs(4));
        summary.rows_loaded = 1000;
        assert_eq!(summary.throughput(), 250.0);
    }
}
