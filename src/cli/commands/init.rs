//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bqsync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing bqsync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your project and dataset", self.output);
                println!("  2. Provide credentials, either:");
                println!("     - GOOGLE_APPLICATION_CREDENTIALS for application default credentials");
                println!("     - bigquery.credentials with a service account key");
                println!("  3. Validate configuration: bqsync validate-config");
                println!("  4. Preview the query: bqsync plan");
                println!("  5. Run the sync: bqsync sync");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }
}

fn generate_minimal_config() -> String {
    r#"# bqsync configuration
# BigQuery GA4 export to DuckDB

[date_range]
type = "date_range"
start_date = 2024-01-01
end_date = 2024-01-31

[bigquery]
project_id = "my-gcp-project"
dataset = "analytics_123456789"

[output]
duckdb_file = "data/events.duckdb"
table_name = "events_raw"
"#
    .to_string()
}

fn generate_config_with_examples() -> String {
    r#"# bqsync configuration
# BigQuery GA4 export to DuckDB
#
# ${VAR} placeholders are replaced from the environment (a .env file is
# loaded first). Values inside double quotes are escaped, so JSON is safe. Any key can also be overridden with BQSYNC_<SECTION>_<KEY>,
# e.g. BQSYNC_DATE_RANGE_END_DATE=2024-02-29.

[application]
# trace | debug | info | warn | error
log_level = "info"

[date_range]
# "date_range": extract start_date..=end_date, start_date must be earlier
# "days": extract the max_days_extraction days before end_date, plus end_date
type = "days"
end_date = 2024-01-31
max_days_extraction = 7
# start_date = 2024-01-01

[bigquery]
project_id = "my-gcp-project"
dataset = "analytics_123456789"
# Shards are <table_prefix>YYYYMMDD
table_prefix = "events_"

# Credentials, first match wins:
#   access_token  static OAuth2 bearer token
#   credentials   service account key JSON
#   neither       application default credentials
# credentials = "${GOOGLE_SERVICE_ACCOUNT_JSON}"
# access_token = "${BQSYNC_ACCESS_TOKEN}"

# location = "EU"

# Rows per result page, 1..=100000
batch_size = 50000
poll_timeout_ms = 10000
request_timeout_seconds = 120

[output]
duckdb_file = "data/events.duckdb"
table_name = "events_raw"
# Only "replace" is implemented: the table is dropped and rebuilt every run
merge_type = "replace"

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "bqsync.toml".to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.output, "bqsync.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        let minimal = parse_config(&generate_minimal_config()).unwrap();
        assert_eq!(minimal.date_range.range_type, "date_range");

        let full = parse_config(&generate_config_with_examples()).unwrap();
        assert_eq!(full.date_range.max_days_extraction, Some(7));
        assert!(full.bigquery.credentials.is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("bqsync.toml");
        fs::write(&output, "existing").unwrap();

        let mut args = InitArgs {
            output: output.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[bigquery]"));
    }
}
