//! Tests for QueryStep: submission / completion behaviour against a scripted service.

use std::sync::Mutex;

use async_trait::async_trait;
use scifi_athena::*;

#[derive(Default)]
struct ScriptedService {
    calls: Mutex<Vec<String>>,
    fail_completion: bool,
}

impl ScriptedService {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryService for ScriptedService {
    async fn get_database_metadata(
        &self,
        catalog: &str,
        database: &str,
    ) -> Result<DatabaseMetadata, AthenaError> {
        Err(AthenaError::DatabaseNotFound {
            catalog: catalog.into(),
            database: database.into(),
        })
    }

    async fn submit_query(&self, request: &QueryRequest) -> Result<QueryId, AthenaError> {
        self.calls.lock().unwrap().push(format!("submit:{}", request.sql));
        Ok(QueryId::new("q-1"))
    }

    async fn wait_for_completion(&self, query_id: &QueryId) -> Result<QueryMetadata, AthenaError> {
        self.calls.lock().unwrap().push(format!("wait:{query_id}"));
        if self.fail_completion {
            return Err(AthenaError::QueryFailed {
                query_id: query_id.to_string(),
                reason: "FAILED: SYNTAX_ERROR".into(),
            });
        }
        Ok(QueryMetadata {
            query_id: query_id.to_string(),
            bytes_scanned: 0,
            execution_time_ms: 12,
            state: "SUCCEEDED".into(),
            output_location: None,
        })
    }

    async fn cancel_query(&self, _query_id: &QueryId) -> Result<(), AthenaError> {
        Ok(())
    }
}

fn step(wait: bool) -> QueryStep {
    QueryStep::new(
        "create_athena_movie_table",
        QueryStepParams {
            sql: "CREATE EXTERNAL TABLE IF NOT EXISTS db1.movies (movieId int)".into(),
            database: Some("db1".into()),
            workgroup: "primary".into(),
            output_location: "s3://bucket1/undefinedcreate_athena_movie_table".into(),
            wait,
        },
    )
}

#[tokio::test]
async fn test_waiting_step_polls_for_completion() {
    let service = ScriptedService::default();
    let receipt = step(true).execute(&service).await.expect("execute");

    assert_eq!(receipt.query_id.as_str(), "q-1");
    assert_eq!(receipt.metadata.map(|m| m.state), Some("SUCCEEDED".to_string()));
    assert_eq!(
        service.calls(),
        vec![
            "submit:CREATE EXTERNAL TABLE IF NOT EXISTS db1.movies (movieId int)".to_string(),
            "wait:q-1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_fire_and_forget_step_only_submits() {
    let service = ScriptedService::default();
    let receipt = step(false).execute(&service).await.expect("execute");

    assert!(receipt.metadata.is_none());
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn test_completion_failure_propagates() {
    let service = ScriptedService {
        fail_completion: true,
        ..Default::default()
    };
    let err = step(true).execute(&service).await.unwrap_err();
    assert!(matches!(err, AthenaError::QueryFailed { .. }));
}
