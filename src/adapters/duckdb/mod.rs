//! DuckDB destination adapter
//!
//! - [`ensure_database_exists`] creates the database file before any write
//! - [`DuckDbDestination`] implements [`crate::adapters::database::DestinationStore`]
//! - [`ddl`] maps Arrow schemas to DuckDB column types

pub mod bootstrap;
pub mod client;
pub mod ddl;

pub use bootstrap::ensure_database_exists;
pub use client::{table_columns, DuckDbDestination, APPEND_CHUNK_ROWS};
