//! External system integrations for bqsync.
//!
//! - [`warehouse`] - Remote query abstraction (trait-based)
//! - [`bigquery`] - Google BigQuery REST implementation
//! - [`database`] - Destination store abstraction (trait-based)
//! - [`duckdb`] - DuckDB implementation and file bootstrap
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so that the core
//! pipeline can be driven by in-memory fakes in tests.
//!
//! ```rust,no_run
//! use bqsync::adapters::warehouse::create_warehouse_client;
//! use bqsync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bqsync.toml")?;
//! let warehouse = create_warehouse_client(&config.bigquery).await?;
//! let handle = warehouse.submit_query("SELECT 1 AS one").await?;
//! println!("rows: {}", handle.total_row_count());
//! # Ok(())
//! # }
//! ```

pub mod bigquery;
pub mod database;
pub mod duckdb;
pub mod warehouse;
