//! Sync command implementation
//!
//! This module implements the `sync` command: extract the configured date
//! range from BigQuery and replace the DuckDB destination table with it.

use super::{load_or_report, resolve_range};
use crate::adapters::warehouse::create_warehouse_client;
use crate::core::extract::ExtractTarget;
use crate::core::sync::{Phase, PipelineFailure, SyncCoordinator};
use crate::domain::SyncError;
use crate::log_phase_failure;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let Some(config) = load_or_report(config_path) else {
            return Ok(2); // Configuration error exit code
        };

        // Resolve up front so a bad range never reaches BigQuery
        let range = match resolve_range(&config) {
            Ok(range) => range,
            Err(e) => {
                log_phase_failure!(Phase::Resolve, &e);
                eprintln!("Invalid date range: {e}");
                return Ok(2);
            }
        };

        if !self.yes {
            println!("Sync Configuration:");
            println!("  Date range: {range}");
            println!(
                "  Source: {}",
                ExtractTarget::from_config(&config.bigquery).wildcard_table()
            );
            println!("  Batch size: {}", config.bigquery.batch_size);
            println!(
                "  Destination: {} -> {} (replaced)",
                config.output.duckdb_file, config.output.table_name
            );
            println!();
            print!("Proceed with sync? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Sync cancelled.");
                return Ok(0);
            }
        }

        let warehouse = match create_warehouse_client(&config.bigquery).await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create BigQuery client");
                eprintln!("Failed to initialize BigQuery client: {e}");
                return Ok(if e.is_configuration() { 2 } else { 4 });
            }
        };

        println!("🚀 Starting sync...");
        println!();

        let coordinator = SyncCoordinator::new(config, warehouse);
        let summary = match coordinator.execute_range(range).await {
            Ok(summary) => summary,
            Err(failure) => {
                log_phase_failure!(failure.phase, &failure.source);
                eprintln!("Sync failed: {failure}");
                return Ok(exit_code(&failure));
            }
        };

        println!();
        println!("📊 Sync Summary:");
        println!("  Date range: {}", summary.range);
        println!("  Table: {} ({})", summary.table, summary.duckdb_file);
        println!("  Rows: {}/{}", summary.rows_loaded, summary.total_rows);
        println!("  Batches: {}", summary.batch_count);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        println!("✅ Sync completed successfully!");

        Ok(0)
    }
}

/// Map a pipeline failure to the process exit code
pub fn exit_code(failure: &PipelineFailure) -> i32 {
    if let SyncError::EmptyResult { .. } = failure.source {
        return 6;
    }
    match failure.phase {
        Phase::Resolve => 2,
        Phase::Bootstrap => 3,
        Phase::Extract => 4,
        Phase::Load => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteQueryError;
    use test_case::test_case;

    #[test_case(Phase::Resolve, SyncError::Configuration("x".into()), 2 ; "resolve")]
    #[test_case(Phase::Bootstrap, SyncError::StorageUnavailable("x".into()), 3 ; "bootstrap")]
    #[test_case(Phase::Extract, RemoteQueryError::Timeout("x".into()).into(), 4 ; "extract")]
    #[test_case(Phase::Load, SyncError::Database("x".into()), 5 ; "load")]
    #[test_case(Phase::Load, SyncError::EmptyResult { table: "t".into() }, 6 ; "empty result")]
    fn test_exit_code(phase: Phase, source: SyncError, expected: i32) {
        assert_eq!(exit_code(&PipelineFailure::new(phase, source)), expected);
    }

    #[test]
    fn test_sync_args_defaults() {
        let args = SyncArgs { yes: false };
        assert!(!args.yes);
    }
}
