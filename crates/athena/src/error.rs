//! Errors surfaced by the query execution client.

/// Errors that can occur during Athena operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AthenaError {
    /// The catalog has no database with this name.
    #[error("Database {database} not found in catalog {catalog}")]
    DatabaseNotFound { catalog: String, database: String },

    /// The query execution failed on the Athena side.
    #[error("Query {query_id} failed: {reason}")]
    QueryFailed { query_id: String, reason: String },

    /// The query was cancelled (either by the user or by Athena).
    #[error("Query {query_id} was cancelled")]
    QueryCancelled { query_id: String },

    /// The query exceeded the configured timeout.
    #[error("Query {query_id} timed out after {seconds}s")]
    QueryTimeout { query_id: String, seconds: u32 },

    /// Athena accepted the submission but returned no execution id.
    #[error("No query execution ID returned")]
    MissingExecutionId,

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl AthenaError {
    /// `true` when the error means the database is definitely absent, as
    /// opposed to the lookup itself failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DatabaseNotFound { .. })
    }
}
