//! Destination store traits
//!
//! This module defines the operations the batch loader needs from the local
//! analytical store. Calls are synchronous: the store is embedded and owned
//! exclusively by one sync run.

use crate::domain::ids::TableName;
use crate::domain::Result;
use duckdb::arrow::record_batch::RecordBatch;

/// Local table store that accepts Arrow record batches
pub trait DestinationStore: Send {
    /// Execute a statement that returns no rows
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Drop `table` if it exists
    fn drop_table(&mut self, table: &TableName) -> Result<()>;

    /// Whether `table` exists
    fn table_exists(&mut self, table: &TableName) -> Result<bool>;

    /// Create `table` with the schema of `batch` and insert the batch's rows
    ///
    /// Column names and types are exactly those of the batch. Table creation
    /// and the insert are atomic: on error neither is visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the table already exists, a column type has no
    /// store equivalent, or the insert fails.
    fn create_table_from_batch(&mut self, table: &TableName, batch: &RecordBatch) -> Result<()>;

    /// Append the rows of `batch` to an existing `table`
    ///
    /// The append is atomic per batch.
    fn append_batch(&mut self, table: &TableName, batch: &RecordBatch) -> Result<()>;

    /// Number of rows currently in `table`
    fn row_count(&mut self, table: &TableName) -> Result<u64>;

    /// Release the underlying connection
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
