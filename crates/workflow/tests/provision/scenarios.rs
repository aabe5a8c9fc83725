//! End-to-end runs for the two branch outcomes.

use scifi_workflow::{Route, Step, StepState, Workflow};

use crate::config_from;
use crate::mock::{Call, MockCatalog};

#[tokio::test]
async fn absent_database_is_created_then_tables_in_order() {
    let config = config_from(&[("s3_dlake", "bucket1"), ("athena_db", "db1")]);
    let catalog = MockCatalog::new();

    let report = Workflow::new(&config, &catalog).unwrap().run().await;

    assert!(report.succeeded(), "{report}");
    assert_eq!(report.route, Some(Route::CreateDatabase));
    assert_eq!(report.state_of(Step::CreateAthenaDatabase), Some(StepState::Succeeded));
    assert_eq!(report.state_of(Step::SkipAthenaDatabaseCreation), Some(StepState::Skipped));
    assert_eq!(report.state_of(Step::AthenaDatabaseChecksDone), Some(StepState::Succeeded));

    let sql = catalog.submitted_sql();
    assert_eq!(sql.len(), 4);
    assert_eq!(sql[0], "CREATE DATABASE IF NOT EXISTS db1");
    assert!(sql[1].starts_with("CREATE EXTERNAL TABLE IF NOT EXISTS db1.movies"));
    assert!(sql[2].starts_with("CREATE EXTERNAL TABLE IF NOT EXISTS db1.ratings"));
    assert!(sql[3].starts_with("CREATE TABLE IF NOT EXISTS db1.scifi"));

    let requests = catalog.submitted_requests();
    assert_eq!(requests[0].database, None);
    assert_eq!(requests[0].output_location, "s3://bucket1/queries/");
    for request in &requests[1..] {
        assert_eq!(request.database.as_deref(), Some("db1"));
        assert_eq!(request.workgroup, "primary");
        assert!(request.output_location.starts_with("s3://bucket1/"));
    }
    assert!(sql[1].contains("LOCATION 's3://bucket1/movielens/movies/'"));
    assert!(sql[2].contains("LOCATION 's3://bucket1/movielens/ratings/'"));
    assert_eq!(
        requests[3].output_location,
        "s3://bucket1/undefinedcreate_athena_scifi_table"
    );

    assert!(catalog.has_database("db1"));
    assert_eq!(catalog.tables().len(), 3);
}

#[tokio::test]
async fn present_database_skips_creation() {
    let config = config_from(&[("s3_dlake", "bucket1"), ("athena_db", "db1")]);
    let catalog = MockCatalog::new().with_database("db1");

    let report = Workflow::new(&config, &catalog).unwrap().run().await;

    assert!(report.succeeded(), "{report}");
    assert_eq!(report.route, Some(Route::SkipCreation));
    assert_eq!(report.state_of(Step::SkipAthenaDatabaseCreation), Some(StepState::Succeeded));
    assert_eq!(report.state_of(Step::CreateAthenaDatabase), Some(StepState::Skipped));
    assert_eq!(report.state_of(Step::AthenaDatabaseChecksDone), Some(StepState::Succeeded));

    let sql = catalog.submitted_sql();
    assert!(sql.iter().all(|s| !s.contains("CREATE DATABASE")));
    assert_eq!(sql.len(), 3);
    assert!(sql[0].contains("db1.movies"));
    assert!(sql[1].contains("db1.ratings"));
    assert!(sql[2].contains("db1.scifi"));
}

#[tokio::test]
async fn existence_check_queries_the_configured_catalog() {
    let mut config = config_from(&[("athena_db", "db1")]);
    config.catalog = "lake_catalog".into();
    let catalog = MockCatalog::new();

    Workflow::new(&config, &catalog).unwrap().run().await;

    let lookups: Vec<Call> = catalog
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Lookup { .. }))
        .collect();
    assert_eq!(
        lookups,
        vec![Call::Lookup {
            catalog: "lake_catalog".into(),
            database: "db1".into(),
        }]
    );
}

#[tokio::test]
async fn every_step_is_recorded_once_in_dag_order() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new();

    let report = Workflow::new(&config, &catalog).unwrap().run().await;

    let recorded: Vec<Step> = report.steps.iter().map(|r| r.step).collect();
    assert_eq!(recorded, Step::ALL.to_vec());
    assert_eq!(report.dag_id, "athena-create");
    assert_eq!(report.database, "db1");
    assert!(report.finished_at.is_some());
    assert_eq!(
        report.executed(),
        vec![
            Step::PrintVariables,
            Step::CheckAthenaDatabase,
            Step::CreateAthenaDatabase,
            Step::AthenaDatabaseChecksDone,
            Step::CreateAthenaMovieTable,
            Step::CreateAthenaMovieRatings,
            Step::CreateAthenaScifiTable,
        ]
    );
}
