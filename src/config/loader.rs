//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (BQSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Every failure is reported as [`SyncError::Configuration`].
///
/// # Examples
///
/// ```no_run
/// use bqsync::config::loader::load_config;
///
/// let config = load_config("bqsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Runs the same substitution, override and validation steps as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<SyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported in
/// a single error. Values landing inside a double-quoted string are escaped
/// so JSON payloads survive the TOML parse.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            let start = caps.get(0).map_or(0, |m| m.start());
            match std::env::var(var_name) {
                Ok(value) if inside_basic_string(&line[..start]) => escape_basic(&value),
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Whether the end of `prefix` sits inside an open `"..."` string
fn inside_basic_string(prefix: &str) -> bool {
    let mut basic = false;
    let mut literal = false;
    let mut escaped = false;

    for c in prefix.chars() {
        if basic {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => basic = false,
                _ => {}
            }
        } else if literal {
            if c == '\'' {
                literal = false;
            }
        } else if c == '"' {
            basic = true;
        } else if c == '\'' {
            literal = true;
        } else if c == '#' {
            return false;
        }
    }

    basic
}

fn escape_basic(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| SyncError::Configuration(format!("Invalid value for {name} '{value}': {e}")))
}

fn parse_date_override(name: &str, value: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| SyncError::Configuration(format!("Invalid value for {name} '{value}': {e}")))
}

/// Applies environment variable overrides using BQSYNC_* prefix
///
/// Environment variables follow the pattern: BQSYNC_<SECTION>_<KEY>
/// For example: BQSYNC_BIGQUERY_PROJECT_ID, BQSYNC_OUTPUT_TABLE_NAME
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("BQSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Date range overrides
    if let Some(val) = var("BQSYNC_DATE_RANGE_TYPE") {
        config.date_range.range_type = val;
    }
    if let Some(val) = var("BQSYNC_DATE_RANGE_START_DATE") {
        config.date_range.start_date =
            Some(parse_date_override("BQSYNC_DATE_RANGE_START_DATE", &val)?);
    }
    if let Some(val) = var("BQSYNC_DATE_RANGE_END_DATE") {
        config.date_range.end_date =
            Some(parse_date_override("BQSYNC_DATE_RANGE_END_DATE", &val)?);
    }
    if let Some(val) = var("BQSYNC_DATE_RANGE_MAX_DAYS_EXTRACTION") {
        config.date_range.max_days_extraction =
            Some(parse_override("BQSYNC_DATE_RANGE_MAX_DAYS_EXTRACTION", &val)?);
    }

    // BigQuery overrides
    if let Some(val) = var("BQSYNC_BIGQUERY_PROJECT_ID") {
        config.bigquery.project_id = parse_override("BQSYNC_BIGQUERY_PROJECT_ID", &val)?;
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_DATASET") {
        config.bigquery.dataset = parse_override("BQSYNC_BIGQUERY_DATASET", &val)?;
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_TABLE_PREFIX") {
        config.bigquery.table_prefix = val;
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_CREDENTIALS") {
        config.bigquery.credentials = Some(secret_string(val));
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_ACCESS_TOKEN") {
        config.bigquery.access_token = Some(secret_string(val));
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_LOCATION") {
        config.bigquery.location = Some(val);
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_BATCH_SIZE") {
        config.bigquery.batch_size = parse_override("BQSYNC_BIGQUERY_BATCH_SIZE", &val)?;
    }
    if let Some(val) = var("BQSYNC_BIGQUERY_API_BASE_URL") {
        config.bigquery.api_base_url = val;
    }

    // Output overrides
    if let Some(val) = var("BQSYNC_OUTPUT_DUCKDB_FILE") {
        config.output.duckdb_file = val;
    }
    if let Some(val) = var("BQSYNC_OUTPUT_TABLE_NAME") {
        config.output.table_name = parse_override("BQSYNC_OUTPUT_TABLE_NAME", &val)?;
    }
    if let Some(val) = var("BQSYNC_OUTPUT_MERGE_TYPE") {
        config.output.merge_type = val;
    }

    // Logging overrides
    if let Some(val) = var("BQSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("BQSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("BQSYNC_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
