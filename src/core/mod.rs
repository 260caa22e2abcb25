//! Core pipeline logic for bqsync.
//!
//! # Modules
//!
//! - [`range`] - Date range resolution from the configured policy
//! - [`extract`] - Range query construction and remote submission
//! - [`load`] - Batch-by-batch materialization with progress reporting
//! - [`sync`] - Pipeline coordination and run summary
//!
//! # Sync Workflow
//!
//! 1. **Resolve**: Turn `[date_range]` into an inclusive `DateRange`
//! 2. **Bootstrap**: Make sure the DuckDB file exists
//! 3. **Extract**: Query the `events_*` shards and wait for the row count
//! 4. **Load**: Drop, recreate and fill the destination table batch by batch
//! 5. **Report**: Log a `SyncSummary`
//!
//! # Example
//!
//! ```rust,no_run
//! use bqsync::adapters::warehouse::create_warehouse_client;
//! use bqsync::config::load_config;
//! use bqsync::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bqsync.toml")?;
//! let warehouse = create_warehouse_client(&config.bigquery).await?;
//!
//! let coordinator = SyncCoordinator::new(config, warehouse);
//! let summary = coordinator.execute().await?;
//!
//! println!("Loaded {} rows in {} batches", summary.rows_loaded, summary.batch_count);
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod load;
pub mod range;
pub mod sync;
