//! BigQuery REST client
//!
//! Queries run in two phases:
//!
//! 1. `jobs.query` submits the SQL with `maxResults = 0`, then
//!    `jobs.getQueryResults` is long-polled until `jobComplete` is true.
//!    At that point `totalRows` and the result schema are final.
//! 2. Result rows are paged lazily with `maxResults = batch_size` and
//!    `pageToken`; every non-empty page becomes one Arrow record batch.

use super::convert::{arrow_schema, rows_to_record_batch};
use super::models::{
    DataFormatOptions, ErrorResponse, JobReference, QueryRequest, QueryResultsPage,
    TableFieldSchema,
};
use crate::adapters::warehouse::{BatchStream, QueryHandle, WarehouseClient};
use crate::config::{BigQueryConfig, SecretString};
use crate::domain::ids::ProjectId;
use crate::domain::{RemoteQueryError, Result};
use async_trait::async_trait;
use duckdb::arrow::datatypes::SchemaRef;
use duckdb::arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// OAuth scope required for query jobs
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

enum Credentials {
    /// Service account or application default credentials
    Provider(Arc<dyn TokenProvider>),
    /// Pre-issued OAuth access token
    Static(SecretString),
}

struct ClientInner {
    http: Client,
    base_url: String,
    project_id: ProjectId,
    location: Option<String>,
    batch_size: u32,
    poll_timeout_ms: u64,
    credentials: Credentials,
}

/// BigQuery client implementing [`WarehouseClient`]
///
/// Cheap to clone; clones share the HTTP connection pool and credentials.
#[derive(Clone)]
pub struct BigQueryClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for BigQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryClient")
            .field("base_url", &self.inner.base_url)
            .field("project_id", &self.inner.project_id)
            .field("batch_size", &self.inner.batch_size)
            .finish_non_exhaustive()
    }
}

impl BigQueryClient {
    /// Create a client from configuration
    ///
    /// Credentials are taken from `access_token` if set, otherwise from the
    /// `credentials` service-account JSON, otherwise from application
    /// default credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteQueryError::AuthenticationFailed`] if no usable
    /// credentials are found.
    pub async fn new(config: &BigQueryConfig) -> Result<Self> {
        let credentials = if let Some(token) = &config.access_token {
            tracing::debug!("Using static BigQuery access token");
            Credentials::Static(token.clone())
        } else if let Some(key) = &config.credentials {
            let account = CustomServiceAccount::from_json(key.expose_secret().as_ref())
                .map_err(|e| {
                    RemoteQueryError::AuthenticationFailed(format!(
                        "Invalid service account credentials: {e}"
                    ))
                })?;
            tracing::debug!("Using service account credentials");
            Credentials::Provider(Arc::new(account))
        } else {
            let provider = gcp_auth::provider().await.map_err(|e| {
                RemoteQueryError::AuthenticationFailed(format!(
                    "No credentials configured and application default credentials unavailable: {e}"
                ))
            })?;
            tracing::debug!("Using application default credentials");
            Credentials::Provider(provider)
        };

        Self::with_credentials(config, credentials)
    }

    /// Create a client that authenticates with a fixed access token
    pub fn with_access_token(config: &BigQueryConfig, token: SecretString) -> Result<Self> {
        Self::with_credentials(config, Credentials::Static(token))
    }

    fn with_credentials(config: &BigQueryConfig, credentials: Credentials) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RemoteQueryError::ConnectionFailed(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
                location: config.location.clone(),
                batch_size: config.batch_size,
                poll_timeout_ms: config.poll_timeout_ms,
                credentials,
            }),
        })
    }
}

impl ClientInner {
    async fn bearer_token(&self) -> Result<String> {
        match &self.credentials {
            Credentials::Static(token) => Ok(token.expose_secret().as_ref().to_string()),
            Credentials::Provider(provider) => {
                let token = provider.token(&[BIGQUERY_SCOPE]).await.map_err(|e| {
                    RemoteQueryError::AuthenticationFailed(format!(
                        "Failed to obtain access token: {e}"
                    ))
                })?;
                Ok(token.as_str().to_string())
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self.bearer_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteQueryError::Timeout(e.to_string())
            } else {
                RemoteQueryError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body).into());
        }

        response.json::<T>().await.map_err(|e| {
            RemoteQueryError::InvalidResponse(format!("Failed to decode response: {e}")).into()
        })
    }

    async fn start_query(&self, sql: &str) -> Result<QueryResultsPage> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.project_id);
        let body = QueryRequest {
            query: sql.to_string(),
            use_legacy_sql: false,
            max_results: 0,
            timeout_ms: self.poll_timeout_ms,
            location: self.location.clone(),
            format_options: DataFormatOptions {
                use_int64_timestamp: true,
            },
        };

        self.send(self.http.post(&url).json(&body)).await
    }

    async fn query_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<QueryResultsPage> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            self.base_url, job.project_id, job.job_id
        );

        let mut params: Vec<(&str, String)> = vec![
            ("maxResults", max_results.to_string()),
            ("timeoutMs", self.poll_timeout_ms.to_string()),
            ("formatOptions.useInt64Timestamp", "true".to_string()),
        ];
        if let Some(location) = job.location.as_ref().or(self.location.as_ref()) {
            params.push(("location", location.clone()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        self.send(self.http.get(&url).query(&params)).await
    }
}

fn status_error(status: StatusCode, body: &str) -> RemoteQueryError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::UNAUTHORIZED {
        RemoteQueryError::AuthenticationFailed(message)
    } else if status.is_server_error() {
        RemoteQueryError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        RemoteQueryError::ClientError {
            status: status.as_u16(),
            message,
        }
    }
}

fn job_errors(page: &QueryResultsPage) -> Option<String> {
    if page.errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = page
        .errors
        .iter()
        .map(|e| match (&e.reason, &e.message) {
            (Some(reason), Some(message)) => format!("{reason}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(reason), None) => reason.clone(),
            (None, None) => "unknown error".to_string(),
        })
        .collect();
    Some(messages.join("; "))
}

#[async_trait]
impl WarehouseClient for BigQueryClient {
    async fn submit_query(&self, sql: &str) -> Result<Box<dyn QueryHandle>> {
        let inner = &self.inner;

        let mut page = inner.start_query(sql).await?;
        let job = page.job_reference.clone().ok_or_else(|| {
            RemoteQueryError::InvalidResponse("Query response has no jobReference".to_string())
        })?;

        tracing::info!(job_id = %job.job_id, "Query job submitted");

        let mut polls = 0u32;
        while !page.job_complete {
            polls += 1;
            tracing::debug!(job_id = %job.job_id, polls, "Waiting for query job to complete");
            page = inner.query_results(&job, None, 0).await?;
        }

        if let Some(errors) = job_errors(&page) {
            return Err(RemoteQueryError::JobFailed(errors).into());
        }

        let total_rows = page
            .total_rows
            .as_deref()
            .ok_or_else(|| {
                RemoteQueryError::InvalidResponse("Completed job has no totalRows".to_string())
            })?
            .parse::<u64>()
            .map_err(|e| RemoteQueryError::InvalidResponse(format!("Invalid totalRows: {e}")))?;

        let fields = page.schema.map(|s| s.fields).unwrap_or_default();
        let schema = arrow_schema(&fields)?;

        tracing::info!(
            job_id = %job.job_id,
            total_rows,
            columns = fields.len(),
            "Query job completed"
        );

        Ok(Box::new(BigQueryQueryHandle {
            inner: Arc::clone(&self.inner),
            job,
            total_rows,
            fields: Arc::new(fields),
            schema,
        }))
    }
}

/// A completed BigQuery job whose rows have not been paged yet
struct BigQueryQueryHandle {
    inner: Arc<ClientInner>,
    job: JobReference,
    total_rows: u64,
    fields: Arc<Vec<TableFieldSchema>>,
    schema: SchemaRef,
}

impl QueryHandle for BigQueryQueryHandle {
    fn total_row_count(&self) -> u64 {
        self.total_rows
    }

    fn stream_batches(self: Box<Self>) -> BatchStream {
        let handle = Arc::new(*self);
        let pages = stream::try_unfold(PageCursor::First, move |cursor| {
            next_page(Arc::clone(&handle), cursor)
        });
        BatchStream::new(pages.boxed())
    }
}

/// Paging position of a result stream
enum PageCursor {
    First,
    Token(String),
    Exhausted,
}

/// Fetch pages until one has rows, skipping empty intermediate pages
async fn next_page(
    handle: Arc<BigQueryQueryHandle>,
    cursor: PageCursor,
) -> Result<Option<(RecordBatch, PageCursor)>> {
    let mut token = match cursor {
        PageCursor::First => None,
        PageCursor::Token(token) => Some(token),
        PageCursor::Exhausted => return Ok(None),
    };

    loop {
        let page = handle
            .inner
            .query_results(&handle.job, token.as_deref(), handle.inner.batch_size)
            .await?;

        if page.rows.is_empty() {
            match page.page_token {
                Some(next) => {
                    token = Some(next);
                    continue;
                }
                None => return Ok(None),
            }
        }

        let batch = rows_to_record_batch(&handle.schema, &handle.fields, &page.rows)?;
        tracing::debug!(
            job_id = %handle.job.job_id,
            rows = batch.num_rows(),
            "Fetched result page"
        );

        let next = match page.page_token {
            Some(token) => PageCursor::Token(token),
            None => PageCursor::Exhausted,
        };
        return Ok(Some((batch, next)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::models::ErrorProto;

    #[test]
    fn test_status_error_mapping() {
        let body = r#"{"error": {"code": 400, "message": "Syntax error", "status": "INVALID_ARGUMENT"}}"#;
        match status_error(StatusCode::BAD_REQUEST, body) {
            RemoteQueryError::ClientError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Syntax error");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "oops"),
            RemoteQueryError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            RemoteQueryError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn test_job_errors_joined() {
        let page = QueryResultsPage {
            errors: vec![
                ErrorProto {
                    reason: Some("quotaExceeded".to_string()),
                    message: Some("Quota exceeded".to_string()),
                },
                ErrorProto {
                    reason: None,
                    message: Some("second".to_string()),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            job_errors(&page).unwrap(),
            "quotaExceeded: Quota exceeded; second"
        );
        assert!(job_errors(&QueryResultsPage::default()).is_none());
    }
}
