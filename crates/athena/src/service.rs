//! The seam between the provisioning workflow and the managed query service.

use async_trait::async_trait;

use crate::error::AthenaError;
use crate::result::{DatabaseMetadata, QueryId, QueryMetadata, QueryRequest};

/// Operations the workflow needs from a managed SQL query service.
///
/// [`AthenaClient`](crate::AthenaClient) is the AWS-backed implementation;
/// tests substitute an in-memory one.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Look up a database in `catalog`.
    ///
    /// Implementations return [`AthenaError::DatabaseNotFound`] when the
    /// catalog reports the database as absent and some other variant when the
    /// lookup itself could not be completed.
    async fn get_database_metadata(
        &self,
        catalog: &str,
        database: &str,
    ) -> Result<DatabaseMetadata, AthenaError>;

    /// Submit a statement and return once the service has acknowledged it.
    async fn submit_query(&self, request: &QueryRequest) -> Result<QueryId, AthenaError>;

    /// Block until a submitted query reaches a terminal state.
    async fn wait_for_completion(&self, query_id: &QueryId) -> Result<QueryMetadata, AthenaError>;

    /// Request cancellation of a running query.
    async fn cancel_query(&self, query_id: &QueryId) -> Result<(), AthenaError>;

    /// Submit and wait for completion.
    async fn execute(&self, request: &QueryRequest) -> Result<QueryMetadata, AthenaError> {
        let query_id = self.submit_query(request).await?;
        self.wait_for_completion(&query_id).await
    }
}
