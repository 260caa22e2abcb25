//! Domain models and types for bqsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated identifiers** ([`TableName`], [`ProjectId`], [`DatasetId`])
//! - **Date ranges** ([`DateRange`], [`ExtractionPolicy`])
//! - **Progress accounting** ([`ProgressCounter`], [`ProgressObservation`])
//! - **Error types** ([`SyncError`], [`RemoteQueryError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust,no_run
//! use bqsync::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = bqsync::config::load_config("bqsync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod date_range;
pub mod errors;
pub mod ids;
pub mod progress;
pub mod result;

pub use date_range::{DateRange, ExtractionPolicy};
pub use errors::{RemoteQueryError, SyncError};
pub use ids::{DatasetId, ProjectId, TableName};
pub use progress::{ProgressCounter, ProgressObservation};
pub use result::Result;
