//! Sync coordinator - runs resolve, bootstrap, extract and load in order

use crate::adapters::database::DestinationStore;
use crate::adapters::duckdb::{ensure_database_exists, DuckDbDestination};
use crate::adapters::warehouse::WarehouseClient;
use crate::config::SyncConfig;
use crate::core::extract::{BatchExtractor, ExtractTarget};
use crate::core::load::BatchLoader;
use crate::core::range::DateRangeResolver;
use crate::core::sync::summary::SyncSummary;
use crate::domain::{DateRange, ExtractionPolicy, SyncError};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Pipeline stage a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolve,
    Bootstrap,
    Extract,
    Load,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Bootstrap => "bootstrap",
            Phase::Extract => "extract",
            Phase::Load => "load",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sync error tagged with the phase that raised it
#[derive(Debug, thiserror::Error)]
#[error("{phase} phase failed: {source}")]
pub struct PipelineFailure {
    pub phase: Phase,
    #[source]
    pub source: SyncError,
}

impl PipelineFailure {
    pub fn new(phase: Phase, source: SyncError) -> Self {
        Self { phase, source }
    }
}

trait InPhase<T> {
    fn in_phase(self, phase: Phase) -> Result<T, PipelineFailure>;
}

impl<T> InPhase<T> for crate::domain::Result<T> {
    fn in_phase(self, phase: Phase) -> Result<T, PipelineFailure> {
        self.map_err(|source| PipelineFailure::new(phase, source))
    }
}

/// Sync coordinator
pub struct SyncCoordinator {
    config: SyncConfig,
    warehouse: Arc<dyn WarehouseClient>,
}

impl SyncCoordinator {
    /// Create a coordinator over an already-built warehouse client
    pub fn new(config: SyncConfig, warehouse: Arc<dyn WarehouseClient>) -> Self {
        Self { config, warehouse }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Resolve the configured date range without touching any store
    pub fn resolve_range(&self) -> Result<DateRange, PipelineFailure> {
        ExtractionPolicy::from_config(&self.config.date_range)
            .and_then(|policy| DateRangeResolver::new().resolve(&policy))
            .in_phase(Phase::Resolve)
    }

    /// Run the pipeline once
    ///
    /// Phases run strictly in sequence and the first failure ends the run.
    /// A failure during load leaves the batches written so far in place.
    pub async fn execute(&self) -> Result<SyncSummary, PipelineFailure> {
        let range = self.resolve_range()?;
        self.execute_range(range).await
    }

    /// Run the bootstrap, extract and load phases for an already resolved range
    pub async fn execute_range(&self, range: DateRange) -> Result<SyncSummary, PipelineFailure> {
        let start = Instant::now();
        let output = &self.config.output;

        if !output.is_replace() {
            tracing::warn!(
                merge_type = %output.merge_type,
                "Only full replace is implemented; merge_type is ignored"
            );
        }

        tracing::info!(
            range = %range,
            duckdb_file = %output.duckdb_file,
            table = %output.table_name,
            "Starting sync"
        );

        ensure_database_exists(&output.duckdb_file).in_phase(Phase::Bootstrap)?;

        let extractor = BatchExtractor::new(
            Arc::clone(&self.warehouse),
            ExtractTarget::from_config(&self.config.bigquery),
            self.config.bigquery.batch_size,
        );
        let extraction = extractor.extract(&range).await.in_phase(Phase::Extract)?;

        let store = DuckDbDestination::open(&output.duckdb_file).in_phase(Phase::Load)?;
        let mut loader = BatchLoader::new(store);
        let report = loader
            .load(extraction.total_rows, extraction.batches, &output.table_name)
            .await
            .in_phase(Phase::Load)?;
        loader.into_inner().close().in_phase(Phase::Load)?;

        let mut summary = SyncSummary::new(range, output.table_name.clone(), &output.duckdb_file)
            .with_duration(start.elapsed());
        summary.total_rows = extraction.total_rows;
        summary.rows_loaded = report.rows_loaded;
        summary.batch_count = report.batch_count;
        summary.log_summary();

        Ok(summary)
    }
}
