//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for bqsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// bqsync - BigQuery to DuckDB batched loader
#[derive(Parser, Debug)]
#[command(name = "bqsync")]
#[command(version, about, long_about = None)]
#[command(author = "bqsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bqsync.toml", env = "BQSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BQSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the configured date range from BigQuery into DuckDB
    Sync(commands::sync::SyncArgs),

    /// Show the resolved date range and query without running it
    Plan(commands::plan::PlanArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the destination table in the DuckDB file
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
