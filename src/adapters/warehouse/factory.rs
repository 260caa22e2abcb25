//! Warehouse client factory

use super::traits::WarehouseClient;
use crate::adapters::bigquery::BigQueryClient;
use crate::config::BigQueryConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the warehouse client for a `[bigquery]` configuration section
///
/// # Errors
///
/// Returns an error if credentials cannot be loaded or the HTTP client
/// cannot be built.
pub async fn create_warehouse_client(config: &BigQueryConfig) -> Result<Arc<dyn WarehouseClient>> {
    tracing::info!(
        project_id = %config.project_id,
        dataset = %config.dataset,
        "Creating BigQuery client"
    );
    let client = BigQueryClient::new(config).await?;
    Ok(Arc::new(client))
}
