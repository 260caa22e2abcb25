//! Remote extraction of a date-bounded event slice
//!
//! The extractor builds the wildcard range query, waits for the remote job
//! to report its authoritative row count and hands back a lazy batch stream.

use crate::adapters::warehouse::{BatchStream, WarehouseClient};
use crate::config::BigQueryConfig;
use crate::domain::ids::{DatasetId, ProjectId};
use crate::domain::{DateRange, Result};
use std::sync::Arc;

/// Sharded source tables addressed by a wildcard query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTarget {
    pub project_id: ProjectId,
    pub dataset: DatasetId,
    /// Shard prefix, `events_` for GA4 exports
    pub table_prefix: String,
}

impl ExtractTarget {
    pub fn new(project_id: ProjectId, dataset: DatasetId, table_prefix: impl Into<String>) -> Self {
        Self {
            project_id,
            dataset,
            table_prefix: table_prefix.into(),
        }
    }

    pub fn from_config(config: &BigQueryConfig) -> Self {
        Self::new(
            config.project_id.clone(),
            config.dataset.clone(),
            config.table_prefix.clone(),
        )
    }

    /// Fully qualified wildcard table, without backticks
    pub fn wildcard_table(&self) -> String {
        format!(
            "{}.{}.{}*",
            self.project_id, self.dataset, self.table_prefix
        )
    }
}

/// Build the range query over every shard whose suffix falls in `range`
pub fn build_query(range: &DateRange, target: &ExtractTarget) -> String {
    format!(
        "SELECT *\nFROM `{}`\nWHERE _TABLE_SUFFIX BETWEEN '{}' AND '{}'",
        target.wildcard_table(),
        range.start_suffix(),
        range.end_suffix()
    )
}

/// A completed remote query: its row count and the unread batches
#[derive(Debug)]
pub struct Extraction {
    pub total_rows: u64,
    pub batches: BatchStream,
}

/// Submits range queries to the warehouse
pub struct BatchExtractor {
    client: Arc<dyn WarehouseClient>,
    target: ExtractTarget,
    batch_size: u32,
}

impl BatchExtractor {
    pub fn new(client: Arc<dyn WarehouseClient>, target: ExtractTarget, batch_size: u32) -> Self {
        Self {
            client,
            target,
            batch_size,
        }
    }

    pub fn target(&self) -> &ExtractTarget {
        &self.target
    }

    /// Run the range query and return its row count and batch stream
    ///
    /// Resolves only once the remote job is complete. Nothing is returned
    /// on failure, neither a partial count nor a stream.
    pub async fn extract(&self, range: &DateRange) -> Result<Extraction> {
        let sql = build_query(range, &self.target);

        tracing::info!(
            source = %self.target.wildcard_table(),
            range = %range,
            "Submitting extraction query"
        );
        tracing::debug!(sql = %sql, "Extraction query");

        let handle = self.client.submit_query(&sql).await?;
        let total_rows = handle.total_row_count();

        tracing::info!(
            total_rows = total_rows,
            batch_size = self.batch_size,
            expected_batches = expected_batches(total_rows, self.batch_size),
            "Query completed"
        );

        Ok(Extraction {
            total_rows,
            batches: handle.stream_batches(),
        })
    }
}

/// Informational batch estimate, `total / batch_size + 1`
pub fn expected_batches(total_rows: u64, batch_size: u32) -> u64 {
    total_rows / u64::from(batch_size.max(1)) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::warehouse::QueryHandle;
    use crate::domain::SyncError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use duckdb::arrow::array::Int64Array;
    use duckdb::arrow::datatypes::{DataType, Field, Schema};
    use duckdb::arrow::record_batch::RecordBatch;
    use std::sync::Mutex;

    struct RecordingClient {
        queries: Mutex<Vec<String>>,
        rows: Vec<i64>,
    }

    struct FixedHandle {
        rows: Vec<i64>,
    }

    impl QueryHandle for FixedHandle {
        fn total_row_count(&self) -> u64 {
            self.rows.len() as u64
        }

        fn stream_batches(self: Box<Self>) -> BatchStream {
            let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
            let batch =
                RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(self.rows))]).unwrap();
            BatchStream::from_batches(vec![batch])
        }
    }

    #[async_trait]
    impl WarehouseClient for RecordingClient {
        async fn submit_query(&self, sql: &str) -> Result<Box<dyn QueryHandle>> {
            self.queries.lock().unwrap().push(sql.to_string());
            Ok(Box::new(FixedHandle {
                rows: self.rows.clone(),
            }))
        }
    }

    struct FailingClient;

    #[async_trait]
    impl WarehouseClient for FailingClient {
        async fn submit_query(&self, _sql: &str) -> Result<Box<dyn QueryHandle>> {
            Err(crate::domain::RemoteQueryError::JobFailed("accessDenied: no".to_string()).into())
        }
    }

    fn target() -> ExtractTarget {
        ExtractTarget::new(
            ProjectId::new("p").unwrap(),
            DatasetId::new("analytics_1").unwrap(),
            "events_",
        )
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_build_query() {
        let sql = build_query(&january(), &target());
        assert_eq!(
            sql,
            "SELECT *\nFROM `p.analytics_1.events_*`\nWHERE _TABLE_SUFFIX BETWEEN '20240101' AND '20240131'"
        );
    }

    #[test]
    fn test_expected_batches() {
        assert_eq!(expected_batches(120_000, 50_000), 3);
        assert_eq!(expected_batches(100_000, 50_000), 3);
        assert_eq!(expected_batches(0, 50_000), 1);
    }

    #[tokio::test]
    async fn test_extract_submits_once_and_reports_total() {
        let client = Arc::new(RecordingClient {
            queries: Mutex::new(Vec::new()),
            rows: vec![1, 2, 3],
        });
        let extractor = BatchExtractor::new(client.clone(), target(), 50_000);

        let mut extraction = extractor.extract(&january()).await.unwrap();
        assert_eq!(extraction.total_rows, 3);
        let batch = extraction.batches.next_batch().await.unwrap().unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert!(extraction.batches.next_batch().await.unwrap().is_none());

        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("BETWEEN '20240101' AND '20240131'"));
    }

    #[tokio::test]
    async fn test_extract_propagates_remote_failure() {
        let extractor = BatchExtractor::new(Arc::new(FailingClient), target(), 50_000);
        let err = extractor.extract(&january()).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteQuery(_)));
    }
}
