//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the bqsync configuration file.

use super::resolve_range;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let range = match resolve_range(&config) {
            Ok(range) => range,
            Err(e) => {
                println!("❌ Date range is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let credentials = if config.bigquery.access_token.is_some() {
            "static access token"
        } else if config.bigquery.credentials.is_some() {
            "service account key"
        } else {
            "application default credentials"
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Date Range: {} ({})", range, config.date_range.range_type);
        println!("  Project: {}", config.bigquery.project_id);
        println!("  Dataset: {}", config.bigquery.dataset);
        println!("  Table Prefix: {}", config.bigquery.table_prefix);
        println!("  Credentials: {credentials}");
        if let Some(location) = &config.bigquery.location {
            println!("  Location: {location}");
        }
        println!("  Batch Size: {}", config.bigquery.batch_size);
        println!("  DuckDB File: {}", config.output.duckdb_file);
        println!("  Table: {}", config.output.table_name);
        println!("  Merge Type: {}", config.output.merge_type);
        if !config.output.is_replace() {
            println!("  ⚠️  merge_type is ignored; the table is always replaced");
        }
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                config.logging.local_path.as_str()
            } else {
                "disabled"
            }
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("does-not-exist-bqsync.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_reversed_range() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[date_range]
type = "date_range"
start_date = 2024-02-01
end_date = 2024-01-01

[bigquery]
project_id = "p"
dataset = "d"

[output]
duckdb_file = "x.duckdb"
table_name = "t"
"#,
        )
        .unwrap();
        file.flush().unwrap();

        let path = file.path().display().to_string();
        assert_eq!(ValidateArgs {}.execute(&path).await.unwrap(), 2);
    }
}
