//! Result type alias for bqsync
//!
//! This module provides a convenient Result type alias that uses SyncError
//! as the error type.

use super::errors::SyncError;

/// Result type alias for bqsync operations
///
/// # Examples
///
/// ```
/// use bqsync::domain::result::Result;
/// use bqsync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
