//! AWS Athena query execution client.
//!
//! Provides [`AthenaClient`], the AWS-backed [`QueryService`]: catalog
//! lookups, statement submission, and completion polling with exponential
//! backoff and timeout enforcement.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_athena::operation::get_database::GetDatabaseError;
use aws_sdk_athena::types::QueryExecutionState;
use tracing::{debug, error, info, warn};

use crate::config::AthenaConfig;
use crate::error::AthenaError;
use crate::result::{DatabaseMetadata, QueryId, QueryMetadata, QueryRequest};
use crate::service::QueryService;

/// Provider name attached to static credentials built from the profile.
const CREDENTIALS_PROVIDER_NAME: &str = "scifi-dag-profile";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for executing statements against AWS Athena.
///
/// Wraps the AWS SDK Athena client and adds:
/// - "not found" detection for catalog lookups
/// - Exponential-backoff polling with jitter
/// - Timeout enforcement with automatic cancellation
pub struct AthenaClient {
    config: AthenaConfig,
    athena_client: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Create a new [`AthenaClient`] from the given configuration.
    ///
    /// The AWS SDK config is loaded using the region specified in `config`.
    /// A static key pair from the connection profile replaces the default
    /// credentials provider chain when present.
    pub async fn new(config: AthenaConfig) -> Self {
        let region = aws_sdk_athena::config::Region::new(config.region.clone());
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let Some(creds) = &config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None, // expiry
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        if let Some(endpoint) = config.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_cfg = loader.load().await;
        let athena_client = aws_sdk_athena::Client::new(&aws_cfg);

        info!(
            region = %config.region,
            catalog = %config.catalog,
            static_credentials = config.uses_static_credentials(),
            "AthenaClient initialised"
        );

        Self {
            config,
            athena_client,
        }
    }

    pub fn config(&self) -> &AthenaConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Poll [`GetQueryExecution`] with exponential backoff until the query
    /// reaches a terminal state (SUCCEEDED, FAILED, CANCELLED) or the
    /// configured timeout, if any, is exceeded.
    async fn poll_until_complete(
        &self,
        query_id: &str,
    ) -> Result<aws_sdk_athena::types::QueryExecution, AthenaError> {
        let start = Instant::now();
        let timeout = self.config.timeout();
        let poll = self.config.poll;

        let mut delay_ms = poll.initial_delay_ms;

        loop {
            let resp = self
                .athena_client
                .get_query_execution()
                .query_execution_id(query_id)
                .send()
                .await
                .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

            let qe = resp
                .query_execution()
                .ok_or_else(|| {
                    AthenaError::AwsSdk("No query execution in response".into())
                })?
                .clone();

            let state = qe
                .status()
                .and_then(|s| s.state())
                .cloned()
                .unwrap_or(QueryExecutionState::Queued);

            debug!(
                query_id = %query_id,
                state = ?state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling query status"
            );

            match state {
                QueryExecutionState::Succeeded => return Ok(qe),

                QueryExecutionState::Failed => {
                    let reason = qe
                        .status()
                        .and_then(|s| s.state_change_reason())
                        .unwrap_or("unknown")
                        .to_string();

                    error!(query_id = %query_id, reason = %reason, "Query failed");
                    return Err(AthenaError::QueryFailed {
                        query_id: query_id.to_string(),
                        reason,
                    });
                }

                QueryExecutionState::Cancelled => {
                    warn!(query_id = %query_id, "Query was cancelled");
                    return Err(AthenaError::QueryCancelled {
                        query_id: query_id.to_string(),
                    });
                }

                // Queued | Running | unknown future variant
                _ => {}
            }

            if timeout.is_some_and(|limit| start.elapsed() > limit) {
                warn!(
                    query_id = %query_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "Query timed out, cancelling"
                );
                // Best-effort cancel; the timeout is the error we report.
                let _ = self.cancel_query(&QueryId::new(query_id)).await;
                return Err(AthenaError::QueryTimeout {
                    query_id: query_id.to_string(),
                    seconds: self.config.timeout_seconds,
                });
            }

            let sleep_ms = delay_ms + jitter_ms(poll.jitter_ms);
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;

            delay_ms = poll.next_delay_ms(delay_ms);
        }
    }

    /// Extract [`QueryMetadata`] from an SDK [`QueryExecution`].
    fn extract_metadata(
        query_id: &str,
        qe: &aws_sdk_athena::types::QueryExecution,
    ) -> QueryMetadata {
        let stats = qe.statistics();
        let status = qe.status();

        QueryMetadata {
            query_id: query_id.to_string(),
            bytes_scanned: stats
                .and_then(|s| s.data_scanned_in_bytes())
                .unwrap_or(0) as u64,
            execution_time_ms: stats
                .and_then(|s| s.engine_execution_time_in_millis())
                .unwrap_or(0) as u64,
            state: status
                .and_then(|s| s.state())
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            output_location: qe
                .result_configuration()
                .and_then(|rc| rc.output_location())
                .map(|s| s.to_string()),
        }
    }
}

/// Jitter without rand: nanosecond fraction of the current time, in `[0, bound)`.
fn jitter_ms(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % bound
}

#[async_trait]
impl QueryService for AthenaClient {
    async fn get_database_metadata(
        &self,
        catalog: &str,
        database: &str,
    ) -> Result<DatabaseMetadata, AthenaError> {
        debug!(catalog = %catalog, database = %database, "Looking up database");

        let resp = self
            .athena_client
            .get_database()
            .catalog_name(catalog)
            .database_name(database)
            .send()
            .await
            .map_err(|e| {
                // Athena reports an unknown database as a MetadataException.
                if e
                    .as_service_error()
                    .is_some_and(GetDatabaseError::is_metadata_exception)
                {
                    AthenaError::DatabaseNotFound {
                        catalog: catalog.to_string(),
                        database: database.to_string(),
                    }
                } else {
                    AthenaError::AwsSdk(e.to_string())
                }
            })?;

        let db = resp.database().ok_or_else(|| AthenaError::DatabaseNotFound {
            catalog: catalog.to_string(),
            database: database.to_string(),
        })?;

        Ok(DatabaseMetadata {
            name: db.name().to_string(),
            description: db.description().map(|d| d.to_string()),
            parameters: db.parameters().cloned().unwrap_or_default(),
        })
    }

    async fn submit_query(&self, request: &QueryRequest) -> Result<QueryId, AthenaError> {
        info!(
            database = request.database.as_deref().unwrap_or("-"),
            workgroup = %request.workgroup,
            output_location = %request.output_location,
            "Submitting Athena statement"
        );
        debug!(sql = %request.sql, "Statement text");

        let start_resp = self
            .athena_client
            .start_query_execution()
            .query_string(&request.sql)
            .query_execution_context({
                let mut ctx = aws_sdk_athena::types::QueryExecutionContext::builder();
                if !self.config.catalog.is_empty() {
                    ctx = ctx.catalog(&self.config.catalog);
                }
                if let Some(database) = request.database.as_deref().filter(|d| !d.is_empty()) {
                    ctx = ctx.database(database);
                }
                ctx.build()
            })
            .result_configuration(
                aws_sdk_athena::types::ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .work_group(&request.workgroup)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let query_id = start_resp
            .query_execution_id()
            .ok_or(AthenaError::MissingExecutionId)?;

        info!(query_id = %query_id, "Query execution started");
        Ok(QueryId::new(query_id))
    }

    async fn wait_for_completion(&self, query_id: &QueryId) -> Result<QueryMetadata, AthenaError> {
        let qe = self.poll_until_complete(query_id.as_str()).await?;
        let metadata = Self::extract_metadata(query_id.as_str(), &qe);

        info!(
            query_id = %query_id,
            execution_time_ms = metadata.execution_time_ms,
            bytes_scanned = metadata.bytes_scanned,
            "Query succeeded"
        );
        Ok(metadata)
    }

    async fn cancel_query(&self, query_id: &QueryId) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.athena_client
            .stop_query_execution()
            .query_execution_id(query_id.as_str())
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        info!(query_id = %query_id, "Query cancellation requested");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests: helpers only, no AWS calls
// ---------------------------------------------------------------------------
