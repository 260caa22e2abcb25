//! DuckDB destination store

use super::ddl::create_table_sql;
use crate::adapters::database::DestinationStore;
use crate::domain::ids::TableName;
use crate::domain::{Result, SyncError};
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::{params, Connection, Transaction};
use std::path::{Path, PathBuf};

/// Rows handed to the appender per call; DuckDB's vector size
pub const APPEND_CHUNK_ROWS: usize = 2048;

/// [`DestinationStore`] backed by a DuckDB connection
///
/// Owns its connection exclusively for the lifetime of a run.
pub struct DuckDbDestination {
    conn: Connection,
    path: Option<PathBuf>,
}

impl DuckDbDestination {
    /// Open (or create) the database file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Database`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            SyncError::Database(format!(
                "Failed to open DuckDB database {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %path.display(), "Opened DuckDB database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a transient in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    /// Database file path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection, for ad-hoc queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Append `batch` through the DuckDB appender in vector-sized slices
fn append_in_chunks(tx: &Transaction<'_>, table: &TableName, batch: &RecordBatch) -> Result<()> {
    let mut appender = tx.appender(table.as_str())?;
    let mut offset = 0;
    while offset < batch.num_rows() {
        let len = APPEND_CHUNK_ROWS.min(batch.num_rows() - offset);
        appender.append_record_batch(batch.slice(offset, len))?;
        offset += len;
    }
    appender.flush()?;
    Ok(())
}

impl DestinationStore for DuckDbDestination {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn drop_table(&mut self, table: &TableName) -> Result<()> {
        tracing::debug!(table = %table, "Dropping table if it exists");
        self.execute(&format!("DROP TABLE IF EXISTS {}", table.quoted()))
    }

    fn table_exists(&mut self, table: &TableName) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND lower(table_name) = lower(?)",
            params![table.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_table_from_batch(&mut self, table: &TableName, batch: &RecordBatch) -> Result<()> {
        let ddl = create_table_sql(table, batch.schema().as_ref())?;
        tracing::debug!(table = %table, ddl = %ddl, "Creating table from first batch");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&ddl)?;
        append_in_chunks(&tx, table, batch)?;
        tx.commit()?;
        Ok(())
    }

    fn append_batch(&mut self, table: &TableName, batch: &RecordBatch) -> Result<()> {
        let tx = self.conn.transaction()?;
        append_in_chunks(&tx, table, batch)?;
        tx.commit()?;
        Ok(())
    }

    fn row_count(&mut self, table: &TableName) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {}", table.quoted()),
            params![],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|e| SyncError::Database(format!("Invalid row count {count}: {e}")))
    }

    fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| SyncError::Database(format!("Failed to close DuckDB: {e}")))
    }
}

/// Column names of `table`, in table order
pub fn table_columns(conn: &Connection, table: &TableName) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT column_name FROM information_schema.columns \
         WHERE table_schema = current_schema() AND lower(table_name) = lower(?) \
         ORDER BY ordinal_position",
    )?;
    let rows = stmt.query_map(params![table.as_str()], |row| row.get::<_, String>(0))?;
    let mut columns = Vec::new();
    for column in rows {
        columns.push(column?);
    }
    Ok(columns)
}
