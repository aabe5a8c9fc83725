use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Athena query execution id returned on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single statement submission.
///
/// The region is not part of the request: it is bound to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// SQL text, passed through verbatim.
    pub sql: String,
    /// Database context. `None` for statements that create the database.
    pub database: Option<String>,
    pub workgroup: String,
    /// S3 prefix the service writes query results to.
    pub output_location: String,
}

/// Catalog metadata for an existing database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Execution metadata for a completed Athena query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Athena query execution ID.
    pub query_id: String,
    /// Total bytes scanned during execution.
    pub bytes_scanned: u64,
    /// Engine execution time in milliseconds.
    pub execution_time_ms: u64,
    /// Final execution state ("SUCCEEDED", "FAILED", "CANCELLED").
    pub state: String,
    /// S3 output location where results were written, if available.
    pub output_location: Option<String>,
}
