// bqsync - BigQuery to DuckDB batched loader
// Copyright (c) 2025 bqsync Contributors
// Licensed under the MIT License

//! # bqsync - BigQuery to DuckDB batched loader
//!
//! bqsync copies a date-bounded slice of GA4-style event shards
//! (`<project>.<dataset>.events_YYYYMMDD`) from Google BigQuery into a table
//! in a local DuckDB file, one result page at a time.
//!
//! ## Overview
//!
//! - **Resolving** the extraction window from an explicit range or a
//!   trailing window of days
//! - **Extracting** with a single wildcard query over `_TABLE_SUFFIX`
//! - **Loading** Arrow record batches into DuckDB, replacing the table
//! - **Reporting** per-batch progress and a run summary
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Date range resolution, extraction, loading and coordination
//! - [`adapters`] - BigQuery REST client and DuckDB destination
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bqsync::adapters::warehouse::create_warehouse_client;
//! use bqsync::config::load_config;
//! use bqsync::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bqsync.toml")?;
//!     let warehouse = create_warehouse_client(&config.bigquery).await?;
//!
//!     let summary = SyncCoordinator::new(config, warehouse).execute().await?;
//!
//!     println!("Loaded {} rows into {}", summary.rows_loaded, summary.table);
//!     Ok(())
//! }
//! ```
//!
//! ## Loading Semantics
//!
//! Every run replaces the destination table. The first batch drops the old
//! table and creates a new one from its Arrow schema; later batches must
//! carry the same column names and types and are appended. A run that
//! fails midway leaves the batches it already wrote.
//!
//! ```rust,no_run
//! use bqsync::adapters::duckdb::DuckDbDestination;
//! use bqsync::adapters::warehouse::BatchStream;
//! use bqsync::core::load::BatchLoader;
//! use bqsync::domain::ids::TableName;
//! use bqsync::domain::ProgressObservation;
//!
//! # async fn example(batches: BatchStream) -> Result<(), Box<dyn std::error::Error>> {
//! let store = DuckDbDestination::open("events.duckdb")?;
//! let mut loader = BatchLoader::with_sink(store, |o: &ProgressObservation| println!("{o}"));
//!
//! let table = TableName::new("events_raw")?;
//! let report = loader.load(120_000, batches, &table).await?;
//! println!("{} batches", report.batch_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::SyncError`]. The coordinator wraps
//! it in [`core::sync::PipelineFailure`] to record the failing phase.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
