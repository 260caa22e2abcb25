//! Batch-by-batch materialization into the destination table
//!
//! The loader drains a [`BatchStream`] into a [`DestinationStore`]:
//!
//! - first batch: drop the table, recreate it from the batch schema, insert
//! - later batches: check the schema against the first batch, append
//! - stream exhausted: check the loaded row count against the remote total
//!
//! A failure stops the run. Batches already written stay in the table.

use crate::adapters::database::DestinationStore;
use crate::adapters::warehouse::BatchStream;
use crate::domain::ids::TableName;
use crate::domain::{ProgressCounter, ProgressObservation, Result, SyncError};
use duckdb::arrow::datatypes::{Schema, SchemaRef};

/// Receives one observation per loaded batch
pub trait ProgressSink {
    fn observe(&mut self, observation: &ProgressObservation);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressObservation),
{
    fn observe(&mut self, observation: &ProgressObservation) {
        self(observation)
    }
}

/// Default sink: one structured `tracing` event per batch
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn observe(&mut self, observation: &ProgressObservation) {
        tracing::info!(
            batch_index = observation.batch_index,
            rows_in_batch = observation.rows_in_batch,
            rows_processed = observation.rows_processed,
            total_rows = observation.total_rows,
            progress_pct = observation.progress_pct,
            "{}",
            observation
        );
    }
}

/// Outcome of a fully drained stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_loaded: u64,
    pub batch_count: u64,
}

enum LoadState {
    Empty,
    Initialized { schema: SchemaRef },
}

/// Loads batches into one destination table
pub struct BatchLoader<S, P = TracingProgressSink> {
    store: S,
    sink: P,
}

impl<S: DestinationStore> BatchLoader<S> {
    pub fn new(store: S) -> Self {
        Self::with_sink(store, TracingProgressSink)
    }
}

impl<S: DestinationStore, P: ProgressSink> BatchLoader<S, P> {
    pub fn with_sink(store: S, sink: P) -> Self {
        Self { store, sink }
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give back the store, e.g. to close it
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Drain `batches` into `table`
    ///
    /// # Errors
    ///
    /// - [`SyncError::SchemaMismatch`] when a later batch differs from the
    ///   first one in column names or types; nothing of that batch is written
    /// - [`SyncError::EmptyResult`] when the stream yields no batch; the
    ///   table has been dropped by then
    /// - [`SyncError::RowCountMismatch`] when the loaded rows differ from
    ///   `total_rows`
    /// - store and stream errors as they occur
    pub async fn load(
        &mut self,
        total_rows: u64,
        mut batches: BatchStream,
        table: &TableName,
    ) -> Result<LoadReport> {
        let mut state = LoadState::Empty;
        let mut counter = ProgressCounter::new(total_rows);

        while let Some(batch) = batches.next_batch().await? {
            let batch_index = counter.batch_count() + 1;

            state = match state {
                LoadState::Empty => {
                    self.replace_table(table)?;
                    self.store.create_table_from_batch(table, &batch)?;
                    tracing::info!(
                        table = %table,
                        columns = batch.num_columns(),
                        "Created destination table from first batch"
                    );
                    LoadState::Initialized {
                        schema: batch.schema(),
                    }
                }
                LoadState::Initialized { schema } => {
                    ensure_same_columns(batch_index, &schema, &batch.schema())?;
                    self.store.append_batch(table, &batch)?;
                    LoadState::Initialized { schema }
                }
            };

            let observation = counter.record_batch(batch.num_rows() as u64);
            self.sink.observe(&observation);
        }

        if matches!(state, LoadState::Empty) || counter.rows_processed() == 0 {
            self.replace_table(table)?;
            tracing::warn!(
                table = %table,
                batch_count = counter.batch_count(),
                "Query returned no rows"
            );
            return Err(SyncError::EmptyResult {
                table: table.to_string(),
            });
        }

        let report = LoadReport {
            rows_loaded: counter.rows_processed(),
            batch_count: counter.batch_count(),
        };

        if report.rows_loaded != total_rows {
            return Err(SyncError::RowCountMismatch {
                expected: total_rows,
                loaded: report.rows_loaded,
            });
        }

        tracing::info!(
            table = %table,
            rows_loaded = report.rows_loaded,
            batch_count = report.batch_count,
            "Load complete"
        );

        Ok(report)
    }

    fn replace_table(&mut self, table: &TableName) -> Result<()> {
        if self.store.table_exists(table)? {
            tracing::info!(table = %table, "Dropping existing table");
            self.store.drop_table(table)?;
        }
        Ok(())
    }
}

/// Compare column names and types, in order; nullability is not compared
fn ensure_same_columns(batch_index: u64, expected: &Schema, found: &Schema) -> Result<()> {
    let same = expected.fields().len() == found.fields().len()
        && expected
            .fields()
            .iter()
            .zip(found.fields().iter())
            .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type());

    if same {
        return Ok(());
    }

    Err(SyncError::SchemaMismatch {
        batch_index,
        expected: describe(expected),
        found: describe(found),
    })
}

fn describe(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbDestination;
    use duckdb::arrow::array::{Int64Array, StringArray};
    use duckdb::arrow::datatypes::{DataType, Field};
    use duckdb::arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn table() -> TableName {
        TableName::new("events_raw").unwrap()
    }

    fn ids(start: i64, rows: usize) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, true)]));
        let values: Vec<i64> = (start..start + rows as i64).collect();
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    fn names(values: Vec<&str>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Utf8, true)]));
        RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))]).unwrap()
    }

    #[tokio::test]
    async fn test_load_reports_progress_per_batch() {
        let store = DuckDbDestination::open_in_memory().unwrap();
        let mut seen = Vec::new();
        let mut loader = BatchLoader::with_sink(store, |o: &ProgressObservation| seen.push(*o));

        let stream = BatchStream::from_batches(vec![ids(0, 5), ids(5, 5), ids(10, 2)]);
        let report = loader.load(12, stream, &table()).await.unwrap();
        assert_eq!(
            report,
            LoadReport {
                rows_loaded: 12,
                batch_count: 3
            }
        );

        let mut store = loader.into_inner();
        assert_eq!(store.row_count(&table()).unwrap(), 12);
        drop(store);

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].batch_index, 1);
        assert_eq!(seen[1].rows_processed, 10);
        assert_eq!(seen[2].progress_pct, 100.0);
    }

    #[tokio::test]
    async fn test_load_replaces_existing_contents() {
        let mut store = DuckDbDestination::open_in_memory().unwrap();
        store
            .execute("CREATE TABLE events_raw (stale VARCHAR); INSERT INTO events_raw VALUES ('x')")
            .unwrap();

        let mut loader = BatchLoader::new(store);
        loader
            .load(3, BatchStream::from_batches(vec![ids(0, 3)]), &table())
            .await
            .unwrap();

        let store = loader.into_inner();
        let columns = crate::adapters::duckdb::table_columns(store.connection(), &table()).unwrap();
        assert_eq!(columns, vec!["id".to_string()]);
    }

    #[tokio::test]
    async fn test_schema_mismatch_keeps_earlier_batches() {
        let store = DuckDbDestination::open_in_memory().unwrap();
        let mut loader = BatchLoader::new(store);

        let stream = BatchStream::from_batches(vec![ids(0, 4), names(vec!["a", "b"])]);
        let err = loader.load(6, stream, &table()).await.unwrap_err();
        match err {
            SyncError::SchemaMismatch {
                batch_index,
                expected,
                found,
            } => {
                assert_eq!(batch_index, 2);
                assert_eq!(expected, "id: Int64");
                assert_eq!(found, "id: Utf8");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(loader.store_mut().row_count(&table()).unwrap(), 4);
    }

    #[tokio::test]
    async fn test_empty_stream_drops_table() {
        let mut store = DuckDbDestination::open_in_memory().unwrap();
        store.execute("CREATE TABLE events_raw (id BIGINT)").unwrap();

        let mut loader = BatchLoader::new(store);
        let err = loader
            .load(0, BatchStream::empty(), &table())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::EmptyResult { .. }));
        assert!(!loader.store_mut().table_exists(&table()).unwrap());
    }

    #[tokio::test]
    async fn test_only_empty_batches_drop_table() {
        let store = DuckDbDestination::open_in_memory().unwrap();
        let mut loader = BatchLoader::new(store);

        let stream = BatchStream::from_batches(vec![ids(0, 0), ids(0, 0)]);
        let err = loader.load(0, stream, &table()).await.unwrap_err();
        assert!(matches!(err, SyncError::EmptyResult { .. }));
        assert!(!loader.store_mut().table_exists(&table()).unwrap());
    }

    #[tokio::test]
    async fn test_row_count_mismatch() {
        let store = DuckDbDestination::open_in_memory().unwrap();
        let mut loader = BatchLoader::new(store);

        let err = loader
            .load(10, BatchStream::from_batches(vec![ids(0, 7)]), &table())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::RowCountMismatch {
                expected: 10,
                loaded: 7
            }
        ));
    }

    #[test]
    fn test_nullability_is_not_compared() {
        let a = Schema::new(vec![Field::new("id", DataType::Int64, true)]);
        let b = Schema::new(vec![Field::new("id", DataType::Int64, false)]);
        assert!(ensure_same_columns(2, &a, &b).is_ok());

        let c = Schema::new(vec![Field::new("user_id", DataType::Int64, true)]);
        assert!(ensure_same_columns(2, &a, &c).is_err());
    }
}
