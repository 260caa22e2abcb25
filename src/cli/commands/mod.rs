//! CLI command implementations
//!
//! Every command returns the process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Configuration or date range error |
//! | 3 | DuckDB file could not be created |
//! | 4 | BigQuery query failed |
//! | 5 | Load or other fatal error |
//! | 6 | Query returned no rows |

pub mod init;
pub mod plan;
pub mod status;
pub mod sync;
pub mod validate;

use crate::config::{load_config, SyncConfig};
use crate::core::range::DateRangeResolver;
use crate::domain::{DateRange, ExtractionPolicy, Result};

/// Load the configuration file, printing the failure for the user
pub(crate) fn load_or_report(config_path: &str) -> Option<SyncConfig> {
    match load_config(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
            println!("❌ Failed to load configuration file: {config_path}");
            println!("   Error: {e}");
            None
        }
    }
}

/// Resolve `[date_range]` into the range a sync would extract
pub(crate) fn resolve_range(config: &SyncConfig) -> Result<DateRange> {
    let policy = ExtractionPolicy::from_config(&config.date_range)?;
    DateRangeResolver::new().resolve(&policy)
}
