//! Warehouse client traits

use crate::domain::Result;
use async_trait::async_trait;
use duckdb::arrow::record_batch::RecordBatch;
use futures::stream::{self, BoxStream, StreamExt};

/// Client for a remote analytical warehouse
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Submit `sql` and wait until the job has completed
    ///
    /// The returned handle's [`QueryHandle::total_row_count`] is final.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SyncError::RemoteQuery`] for authentication,
    /// transport, job and decoding failures.
    async fn submit_query(&self, sql: &str) -> Result<Box<dyn QueryHandle>>;
}

/// A completed query whose results have not been read yet
pub trait QueryHandle: Send {
    /// Total rows in the result set, known before any batch is read
    fn total_row_count(&self) -> u64;

    /// Consume the handle into a lazy stream of result batches
    fn stream_batches(self: Box<Self>) -> BatchStream;
}

impl std::fmt::Debug for dyn QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle").finish_non_exhaustive()
    }
}

/// Forward-only, single-consumer stream of record batches
///
/// Batches are fetched on demand; at most one is held in memory by the
/// stream at any time. The stream is not `Clone` and is consumed by value.
pub struct BatchStream {
    inner: BoxStream<'static, Result<RecordBatch>>,
}

impl BatchStream {
    /// Wrap a boxed stream of batches
    pub fn new(inner: BoxStream<'static, Result<RecordBatch>>) -> Self {
        Self { inner }
    }

    /// A stream over batches that are already in memory
    pub fn from_batches(batches: Vec<RecordBatch>) -> Self {
        Self::new(stream::iter(batches.into_iter().map(Ok)).boxed())
    }

    /// A stream that yields nothing
    pub fn empty() -> Self {
        Self::new(stream::empty().boxed())
    }

    /// Pull the next batch, or `None` once the stream is exhausted
    pub async fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        self.inner.next().await.transpose()
    }
}

impl std::fmt::Debug for BatchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::arrow::array::Int64Array;
    use duckdb::arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch(values: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    #[tokio::test]
    async fn test_stream_yields_in_order_then_none() {
        let mut stream = BatchStream::from_batches(vec![batch(vec![1, 2]), batch(vec![3])]);

        assert_eq!(stream.next_batch().await.unwrap().unwrap().num_rows(), 2);
        assert_eq!(stream.next_batch().await.unwrap().unwrap().num_rows(), 1);
        assert!(stream.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let mut stream = BatchStream::empty();
        assert!(stream.next_batch().await.unwrap().is_none());
    }
}
