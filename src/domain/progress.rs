//! Progress accounting for a batched load

use serde::Serialize;
use std::fmt;

/// One progress observation, emitted once per loaded batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressObservation {
    /// 1-based index of the batch
    pub batch_index: u64,
    /// Rows in this batch
    pub rows_in_batch: u64,
    /// Rows processed so far, this batch included
    pub rows_processed: u64,
    /// Total rows reported by the warehouse before streaming started
    pub total_rows: u64,
    /// `rows_processed / total_rows * 100`
    pub progress_pct: f64,
}

impl fmt::Display for ProgressObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[BATCH {}] Processing {} rows | Total: {}/{} ({:.1}%)",
            self.batch_index,
            self.rows_in_batch,
            self.rows_processed,
            self.total_rows,
            self.progress_pct
        )
    }
}

/// Run-scoped progress state
///
/// Owned by the load loop and updated once per batch. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    total_rows: u64,
    rows_processed: u64,
    batch_count: u64,
}

impl ProgressCounter {
    /// Create a counter for a result set of `total_rows` rows
    pub fn new(total_rows: u64) -> Self {
        Self {
            total_rows,
            rows_processed: 0,
            batch_count: 0,
        }
    }

    /// Record one batch and return the resulting observation
    pub fn record_batch(&mut self, rows_in_batch: u64) -> ProgressObservation {
        self.batch_count += 1;
        self.rows_processed += rows_in_batch;

        ProgressObservation {
            batch_index: self.batch_count,
            rows_in_batch,
            rows_processed: self.rows_processed,
            total_rows: self.total_rows,
            progress_pct: self.progress_pct(),
        }
    }

    /// Percentage of rows processed; 100 when there is nothing to process
    pub fn progress_pct(&self) -> f64 {
        if self.total_rows == 0 {
            return 100.0;
        }
        (self.rows_processed as f64 / self.total_rows as f64) * 100.0
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_accumulates() {
        let mut counter = ProgressCounter::new(120_000);

        let first = counter.record_batch(50_000);
        assert_eq!(first.batch_index, 1);
        assert_eq!(first.rows_processed, 50_000);
        assert_eq!(format!("{:.1}", first.progress_pct), "41.7");

        let second = counter.record_batch(50_000);
        assert_eq!(second.batch_index, 2);
        assert_eq!(format!("{:.1}", second.progress_pct), "83.3");

        let third = counter.record_batch(20_000);
        assert_eq!(third.rows_processed, 120_000);
        assert_eq!(format!("{:.1}", third.progress_pct), "100.0");

        assert_eq!(counter.batch_count(), 3);
        assert_eq!(counter.rows_processed(), counter.total_rows());
    }

    #[test]
    fn test_zero_total_does_not_divide_by_zero() {
        let mut counter = ProgressCounter::new(0);
        assert_eq!(counter.progress_pct(), 100.0);
        let obs = counter.record_batch(0);
        assert_eq!(obs.progress_pct, 100.0);
    }

    #[test]
    fn test_observation_display() {
        let mut counter = ProgressCounter::new(1_000);
        let obs = counter.record_batch(250);
        assert_eq!(
            obs.to_string(),
            "[BATCH 1] Processing 250 rows | Total: 250/1000 (25.0%)"
        );
    }
}
