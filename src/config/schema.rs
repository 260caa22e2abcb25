//! Configuration schema types
//!
//! This module defines the configuration structure for bqsync.

use crate::config::SecretString;
use crate::domain::ids::{DatasetId, ProjectId, TableName};
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer, Serialize};

/// Main bqsync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Extraction date range policy
    pub date_range: DateRangeConfig,

    /// BigQuery source configuration
    pub bigquery: BigQueryConfig,

    /// DuckDB destination configuration
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.date_range.validate()?;
        self.bigquery.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Date range configuration (`[date_range]`)
///
/// `type = "date_range"` requires `start_date` and `end_date`.
/// `type = "days"` requires `end_date` and `max_days_extraction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeConfig {
    /// Policy kind: "date_range" or "days"
    #[serde(rename = "type")]
    pub range_type: String,

    /// First day to extract (inclusive)
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub start_date: Option<NaiveDate>,

    /// Last day to extract (inclusive)
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub end_date: Option<NaiveDate>,

    /// Window length in days when `type = "days"`
    #[serde(default)]
    pub max_days_extraction: Option<u32>,
}

impl DateRangeConfig {
    fn validate(&self) -> Result<(), String> {
        match self.range_type.as_str() {
            "date_range" => {
                if self.start_date.is_none() {
                    return Err(
                        "date_range.start_date is required when type = 'date_range'".to_string()
                    );
                }
                if self.end_date.is_none() {
                    return Err(
                        "date_range.end_date is required when type = 'date_range'".to_string()
                    );
                }
            }
            "days" => {
                if self.end_date.is_none() {
                    return Err("date_range.end_date is required when type = 'days'".to_string());
                }
                if self.max_days_extraction.is_none() {
                    return Err(
                        "date_range.max_days_extraction is required when type = 'days'"
                            .to_string(),
                    );
                }
            }
            other => {
                return Err(format!(
                    "Invalid date_range.type '{other}'. Must be one of: date_range, days"
                ));
            }
        }
        Ok(())
    }
}

/// BigQuery source configuration (`[bigquery]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// Google Cloud project that owns the dataset and runs the query job
    pub project_id: ProjectId,

    /// Dataset containing the sharded event tables
    pub dataset: DatasetId,

    /// Sharded table prefix; the query targets `<prefix>*`
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Service-account key JSON
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub credentials: Option<SecretString>,

    /// Static OAuth access token, used instead of `credentials` when set
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Job location (e.g. "US", "EU")
    #[serde(default)]
    pub location: Option<String>,

    /// Maximum rows per result page (one page is one batch)
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Server-side long-poll timeout for job completion, in milliseconds
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// BigQuery REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl BigQueryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.table_prefix.is_empty() {
            return Err("bigquery.table_prefix cannot be empty".to_string());
        }
        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "Invalid bigquery.table_prefix '{}': only letters, digits and underscores are allowed",
                self.table_prefix
            ));
        }

        for (key, secret) in [
            ("credentials", &self.credentials),
            ("access_token", &self.access_token),
        ] {
            if secret.as_ref().is_some_and(|s| s.expose_secret().is_blank()) {
                return Err(format!("bigquery.{key} cannot be blank; omit it instead"));
            }
        }

        if self.batch_size == 0 || self.batch_size > 100_000 {
            return Err("bigquery.batch_size must be between 1 and 100000".to_string());
        }

        if self.request_timeout_seconds == 0 {
            return Err("bigquery.request_timeout_seconds must be > 0".to_string());
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(format!(
                "Invalid bigquery.api_base_url '{}': must start with http:// or https://",
                self.api_base_url
            ));
        }

        Ok(())
    }
}

/// DuckDB destination configuration (`[output]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the DuckDB database file
    pub duckdb_file: String,

    /// Destination table, fully replaced on every run
    pub table_name: TableName,

    /// Merge strategy. Only "replace" is implemented; other values are
    /// accepted and logged as ignored.
    #[serde(default = "default_merge_type")]
    pub merge_type: String,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.duckdb_file.trim().is_empty() {
            return Err("output.duckdb_file cannot be empty".to_string());
        }
        Ok(())
    }

    /// Whether `merge_type` selects the implemented full-replace strategy
    pub fn is_replace(&self) -> bool {
        self.merge_type == "replace"
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Accepts either a TOML date (`2024-01-01`) or a `"YYYY-MM-DD"` string
fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<toml::Value>::deserialize(deserializer)?;
    let text = match value {
        None => return Ok(None),
        Some(toml::Value::Datetime(dt)) => match dt.date {
            Some(date) if dt.time.is_none() => date.to_string(),
            _ => {
                return Err(D::Error::custom(format!(
                    "expected a calendar date without time, found '{dt}'"
                )))
            }
        },
        Some(toml::Value::String(s)) => s,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a date, found {}",
                other.type_str()
            )))
        }
    };

    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid date '{text}': {e}")))
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_table_prefix() -> String {
    "events_".to_string()
}

fn default_batch_size() -> u32 {
    50_000
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_seconds() -> u64 {
    120
}

pub(crate) fn default_api_base_url() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

fn default_merge_type() -> String {
    "replace".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn bigquery_config() -> BigQueryConfig {
        BigQueryConfig {
            project_id: ProjectId::new("my-project").unwrap(),
            dataset: DatasetId::new("analytics_123").unwrap(),
            table_prefix: default_table_prefix(),
            credentials: None,
            access_token: None,
            location: None,
            batch_size: default_batch_size(),
            poll_timeout_ms: default_poll_timeout_ms(),
            request_timeout_seconds: default_request_timeout_seconds(),
            api_base_url: default_api_base_url(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_range_config_validation() {
        let mut config = DateRangeConfig {
            range_type: "date_range".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            max_days_extraction: None,
        };
        assert!(config.validate().is_ok());

        config.start_date = None;
        assert!(config.validate().is_err());

        // Trailing window needs max_days_extraction
        config.range_type = "days".to_string();
        assert!(config.validate().is_err());
        config.max_days_extraction = Some(7);
        assert!(config.validate().is_ok());

        config.range_type = "weeks".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("weeks"));
    }

    #[test]
    fn test_bigquery_config_validation() {
        let mut config = bigquery_config();
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = 100_001;
        assert!(config.validate().is_err());

        config.batch_size = 100_000;
        config.table_prefix = "events`*".to_string();
        assert!(config.validate().is_err());

        config.table_prefix = "events_".to_string();
        config.api_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_secrets_are_rejected() {
        let mut config = bigquery_config();
        config.access_token = Some(secret_string(String::new()));
        let err = config.validate().unwrap_err();
        assert!(err.contains("bigquery.access_token"));

        config.access_token = Some(secret_string("ya29.token".to_string()));
        assert!(config.validate().is_ok());

        config.credentials = Some(secret_string("  \n".to_string()));
        let err = config.validate().unwrap_err();
        assert!(err.contains("bigquery.credentials"));
    }

    #[test]
    fn test_output_merge_type() {
        let mut config = OutputConfig {
            duckdb_file: "events.duckdb".to_string(),
            table_name: TableName::new("events_raw").unwrap(),
            merge_type: default_merge_type(),
        };
        assert!(config.is_replace());
        assert!(config.validate().is_ok());

        config.merge_type = "append".to_string();
        assert!(!config.is_replace());
        // Unknown merge types are accepted
        assert!(config.validate().is_ok());

        config.duckdb_file = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_accepts_toml_date_and_string() {
        let config: DateRangeConfig = toml::from_str(
            r#"
type = "date_range"
start_date = 2024-01-01
end_date = "2024-01-31"
"#,
        )
        .unwrap();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_date_rejects_garbage() {
        let result: Result<DateRangeConfig, _> = toml::from_str(
            r#"
type = "date_range"
start_date = "January 1st"
"#,
        );
        assert!(result.is_err());
    }
}
