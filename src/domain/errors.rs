//! Domain error types
//!
//! This module defines the error hierarchy for bqsync.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main bqsync error type
///
/// This is the primary error type used throughout the application.
/// Every variant is fatal to a sync run; there is no retry and no
/// partial-success reporting.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or invalid configuration, including invalid date ordering
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Destination path not writable or not creatable
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Remote warehouse errors
    #[error("Remote query error: {0}")]
    RemoteQuery(#[from] RemoteQueryError),

    /// A batch does not match the schema of the table created from batch 1
    #[error(
        "Schema mismatch in batch {batch_index}: expected columns [{expected}], found [{found}]"
    )]
    SchemaMismatch {
        batch_index: u64,
        expected: String,
        found: String,
    },

    /// The query resolved to zero rows; the destination table was dropped and not recreated
    #[error("Query returned no rows; table '{table}' was dropped and not recreated")]
    EmptyResult { table: String },

    /// The number of loaded rows differs from the total reported by the warehouse
    #[error("Row count mismatch: warehouse reported {expected} rows, loaded {loaded}")]
    RowCountMismatch { expected: u64, loaded: u64 },

    /// Destination database errors
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Remote warehouse errors
///
/// Errors that occur when submitting a query or streaming its results.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum RemoteQueryError {
    /// Failed to obtain credentials or an access token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to reach the warehouse
    #[error("Failed to connect to warehouse: {0}")]
    ConnectionFailed(String),

    /// The query job finished with an error
    #[error("Query job failed: {0}")]
    JobFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx), e.g. quota exceeded or malformed predicate
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response could not be decoded or is missing required fields
    #[error("Invalid response from warehouse: {0}")]
    InvalidResponse(String),

    /// Column type that cannot be represented as an Arrow column
    #[error("Unsupported column type '{field_type}' for column '{column}'")]
    UnsupportedType { column: String, field_type: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl SyncError {
    /// Returns true if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<duckdb::Error> for SyncError {
    fn from(err: duckdb::Error) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<duckdb::arrow::error::ArrowError> for SyncError {
    fn from(err: duckdb::arrow::error::ArrowError) -> Self {
        SyncError::Serialization(format!("Arrow error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_remote_query_error_conversion() {
        let remote_err = RemoteQueryError::JobFailed("quota exceeded".to_string());
        let err: SyncError = remote_err.into();
        assert!(matches!(err, SyncError::RemoteQuery(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = SyncError::SchemaMismatch {
            batch_index: 2,
            expected: "id: Int64".to_string(),
            found: "id: Utf8".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("batch 2"));
        assert!(msg.contains("id: Utf8"));
    }

    #[test]
    fn test_empty_result_display() {
        let err = SyncError::EmptyResult {
            table: "events_raw".to_string(),
        };
        assert!(err.to_string().contains("'events_raw'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SyncError = toml_err.into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sync_error_implements_std_error() {
        let err = SyncError::Database("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
