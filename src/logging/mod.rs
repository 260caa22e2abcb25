//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output
//! - Optional JSON log files with rotation
//! - Level control from configuration, CLI or `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use bqsync::logging::init_logging;
//! use bqsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "events_raw", "Sync started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a failed pipeline phase
///
/// # Example
///
/// ```no_run
/// use bqsync::log_phase_failure;
/// use bqsync::domain::SyncError;
///
/// let error = SyncError::StorageUnavailable("read-only filesystem".to_string());
/// log_phase_failure!("bootstrap", &error);
/// ```
#[macro_export]
macro_rules! log_phase_failure {
    ($phase:expr, $error:expr) => {
        tracing::error!(
            phase = %$phase,
            error = %$error,
            "Sync failed"
        );
    };
}
