//! Google BigQuery adapter
//!
//! Implements [`crate::adapters::warehouse::WarehouseClient`] on top of the
//! BigQuery REST API v2, converting JSON result pages to Arrow batches.

pub mod client;
pub mod convert;
pub mod models;

pub use client::{BigQueryClient, BIGQUERY_SCOPE};
