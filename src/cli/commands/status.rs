//! Status command implementation
//!
//! This module implements the `status` command, which reports what the last
//! sync left in the DuckDB file. The file is never created here.

use super::load_or_report;
use crate::adapters::database::DestinationStore;
use crate::adapters::duckdb::{table_columns, DuckDbDestination};
use clap::Args;
use std::path::Path;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking destination status");

        println!("📊 Sync Status");
        println!();

        let Some(config) = load_or_report(config_path) else {
            return Ok(2); // Configuration error exit code
        };
        let output = &config.output;

        if !Path::new(&output.duckdb_file).is_file() {
            println!("DuckDB file not found: {}", output.duckdb_file);
            println!("Run 'bqsync sync' to create and load it.");
            return Ok(0);
        }

        let mut store = match DuckDbDestination::open(&output.duckdb_file) {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to open DuckDB file");
                println!("   Error: {e}");
                return Ok(3); // Storage error exit code
            }
        };

        println!("  DuckDB file: {}", output.duckdb_file);

        match store.table_exists(&output.table_name) {
            Ok(false) => {
                println!("  Table {}: not found", output.table_name);
                println!();
                return Ok(0);
            }
            Ok(true) => {}
            Err(e) => {
                println!("❌ Failed to inspect DuckDB file");
                println!("   Error: {e}");
                return Ok(5);
            }
        }

        let rows = store.row_count(&output.table_name);
        let columns = table_columns(store.connection(), &output.table_name);
        match (rows, columns) {
            (Ok(rows), Ok(columns)) => {
                println!("  Table {}: {} rows", output.table_name, rows);
                println!("  Columns ({}): {}", columns.len(), columns.join(", "));
                println!();
            }
            (Err(e), _) | (_, Err(e)) => {
                println!("❌ Failed to read table {}", output.table_name);
                println!("   Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        }

        store.close()?;
        Ok(0)
    }
}
