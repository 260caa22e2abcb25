//! Destination file bootstrap

use crate::domain::{Result, SyncError};
use duckdb::Connection;
use std::path::Path;

/// Make sure a DuckDB database file exists at `path`
///
/// An existing file is left untouched. Otherwise a connection is opened,
/// which creates the file, and closed again.
///
/// # Errors
///
/// Returns [`SyncError::StorageUnavailable`] if `path` is a directory, its
/// parent directory is missing or read-only, or DuckDB cannot create the
/// file.
pub fn ensure_database_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if path.is_dir() {
        return Err(SyncError::StorageUnavailable(format!(
            "{} is a directory, not a database file",
            path.display()
        )));
    }

    if path.exists() {
        tracing::info!(path = %path.display(), "DuckDB database found");
        return Ok(());
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let metadata = std::fs::metadata(parent).map_err(|e| {
        SyncError::StorageUnavailable(format!(
            "Parent directory {} is not accessible: {}",
            parent.display(),
            e
        ))
    })?;
    if !metadata.is_dir() {
        return Err(SyncError::StorageUnavailable(format!(
            "Parent path {} is not a directory",
            parent.display()
        )));
    }
    if metadata.permissions().readonly() {
        return Err(SyncError::StorageUnavailable(format!(
            "Parent directory {} is not writable",
            parent.display()
        )));
    }

    tracing::info!(path = %path.display(), "DuckDB database not found, creating");

    let conn = Connection::open(path).map_err(|e| {
        SyncError::StorageUnavailable(format!(
            "Failed to create DuckDB database {}: {}",
            path.display(),
            e
        ))
    })?;
    conn.close().map_err(|(_, e)| {
        SyncError::StorageUnavailable(format!(
            "Failed to close DuckDB database {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.duckdb");

        ensure_database_exists(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.duckdb");

        ensure_database_exists(&path).unwrap();
        let size = std::fs::metadata(&path).unwrap().len();
        ensure_database_exists(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), size);
    }

    #[test]
    fn test_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("events.duckdb");

        let err = ensure_database_exists(&path).unwrap_err();
        assert!(matches!(err, SyncError::StorageUnavailable(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_directory_path() {
        let dir = TempDir::new().unwrap();
        let err = ensure_database_exists(dir.path()).unwrap_err();
        assert!(matches!(err, SyncError::StorageUnavailable(_)));
    }
}
