//! Integration tests for logging initialization
//!
//! The global subscriber can be installed once per process, so this file
//! holds a single initialization test.

use bqsync::config::LoggingConfig;
use bqsync::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    assert!(!log_path.exists());
    let guard = init_logging("debug", &config).unwrap();
    // Only bqsync targets pass the default filter
    bqsync::adapters::duckdb::ensure_database_exists(temp_dir.path().join("events.duckdb"))
        .unwrap();
    drop(guard);

    assert!(log_path.is_dir());
    let contents = std::fs::read_to_string(log_path.join("bqsync.log")).unwrap();
    assert!(contents.contains("DuckDB database not found, creating"));
}
