//! Plan command implementation
//!
//! Prints what `sync` would do: the resolved date range, the query and the
//! destination. Nothing is contacted or written.

use super::{load_or_report, resolve_range};
use crate::core::extract::{build_query, ExtractTarget};
use clap::Args;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {}

impl PlanArgs {
    /// Execute the plan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_or_report(config_path) else {
            return Ok(2);
        };

        let range = match resolve_range(&config) {
            Ok(range) => range,
            Err(e) => {
                println!("❌ Invalid date range");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let target = ExtractTarget::from_config(&config.bigquery);

        println!("📋 Sync Plan");
        println!();
        println!("  Date range: {} ({} days)", range, range.num_days());
        println!("  Source: {}", target.wildcard_table());
        println!("  Batch size: {}", config.bigquery.batch_size);
        println!(
            "  Destination: {} -> {}",
            config.output.duckdb_file, config.output.table_name
        );
        println!("  Merge type: {}", config.output.merge_type);
        println!();
        println!("Query:");
        println!("{}", build_query(&range, &target));

        Ok(0)
    }
}
