use serde::{Deserialize, Serialize};

use crate::error::AthenaError;
use crate::result::{QueryId, QueryMetadata, QueryRequest};
use crate::service::QueryService;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters for a single statement step in the provisioning DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStepParams {
    /// SQL statement to submit.
    pub sql: String,
    /// Database context. Absent for `CREATE DATABASE`.
    #[serde(default)]
    pub database: Option<String>,
    pub workgroup: String,
    /// S3 prefix for query results.
    pub output_location: String,
    /// Wait for the statement to finish instead of returning on acknowledgment.
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Query Step
// ---------------------------------------------------------------------------

/// A named statement submission within the provisioning DAG.
///
/// # Example JSON
/// ```json
/// {
///   "id": "create_athena_movie_table",
///   "params": {
///     "sql": "CREATE EXTERNAL TABLE IF NOT EXISTS db1.movies (...)",
///     "database": "db1",
///     "workgroup": "primary",
///     "output_location": "s3://bucket1/undefinedcreate_athena_movie_table"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStep {
    /// Task id of the step.
    pub id: String,
    pub params: QueryStepParams,
}

/// What a step execution produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReceipt {
    pub query_id: QueryId,
    /// Present only when the step waited for completion.
    pub metadata: Option<QueryMetadata>,
}

impl QueryStep {
    pub fn new(id: impl Into<String>, params: QueryStepParams) -> Self {
        Self { id: id.into(), params }
    }

    pub fn request(&self) -> QueryRequest {
        QueryRequest {
            sql: self.params.sql.clone(),
            database: self.params.database.clone(),
            workgroup: self.params.workgroup.clone(),
            output_location: self.params.output_location.clone(),
        }
    }

    /// Submit the statement and, if `params.wait` is set, wait for it to succeed.
    pub async fn execute(&self, service: &dyn QueryService) -> Result<StepReceipt, AthenaError> {
        let query_id = service.submit_query(&self.request()).await?;
        tracing::debug!(step = %self.id, query_id = %query_id, "Statement acknowledged");

        let metadata = if self.params.wait {
            Some(service.wait_for_completion(&query_id).await?)
        } else {
            None
        };

        Ok(StepReceipt { query_id, metadata })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
