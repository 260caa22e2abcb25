//! Configuration management for bqsync.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! bqsync uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`), escaped inside `"..."`
//! - `BQSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bqsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bqsync.toml")?;
//!
//! println!("Project: {}", config.bigquery.project_id);
//! println!("Destination: {}", config.output.duckdb_file);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DateRangeConfig`] - Extraction date range policy
//! - [`BigQueryConfig`] - Source project, dataset, credentials and paging
//! - [`OutputConfig`] - DuckDB file, table and merge type
//! - [`LoggingConfig`] - Local log file settings
//!
//! # Example Configuration
//!
//! ```toml
//! [date_range]
//! type = "days"
//! end_date = 2024-01-31
//! max_days_extraction = 7
//!
//! [bigquery]
//! project_id = "my-project"
//! dataset = "analytics_123456"
//! credentials = "${GOOGLE_SERVICE_ACCOUNT_JSON}"
//!
//! [output]
//! duckdb_file = "data/events.duckdb"
//! table_name = "events_raw"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BigQueryConfig, DateRangeConfig, LoggingConfig, OutputConfig, SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
