//! Failure routing, ordering and idempotence.

use scifi_athena::AthenaError;
use scifi_workflow::{Route, Step, StepState, Workflow, WorkflowError};

use crate::config_from;
use crate::mock::{Call, MockCatalog};

#[tokio::test]
async fn lookup_errors_route_to_creation() {
    let errors = [
        AthenaError::AwsSdk("dispatch failure: connection reset".into()),
        AthenaError::AwsSdk("AccessDeniedException".into()),
    ];

    for err in errors {
        let config = config_from(&[("athena_db", "db1")]);
        // The database exists, but the lookup cannot tell.
        let catalog = MockCatalog::new().with_database("db1").failing_lookup(err);

        let report = Workflow::new(&config, &catalog).unwrap().run().await;

        assert_eq!(report.route, Some(Route::CreateDatabase));
        assert_eq!(catalog.submitted_sql()[0], "CREATE DATABASE IF NOT EXISTS db1");
        assert!(report.succeeded(), "{report}");
    }
}

#[tokio::test]
async fn aggregate_is_submitted_after_both_raw_tables_complete() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new();

    Workflow::new(&config, &catalog).unwrap().run().await;

    let calls = catalog.calls();
    let submit_of = |fragment: &str| {
        calls
            .iter()
            .find_map(|c| match c {
                Call::Submit { query_id, request } if request.sql.contains(fragment) => {
                    Some(query_id.clone())
                }
                _ => None,
            })
            .unwrap()
    };
    let position = |wanted: &Call| calls.iter().position(|c| c == wanted).unwrap();

    let movies_done = position(&Call::Wait { query_id: submit_of("db1.movies (") });
    let ratings_done = position(&Call::Wait { query_id: submit_of("db1.ratings (") });
    let scifi_id = submit_of("db1.scifi");
    let scifi_submitted = calls
        .iter()
        .position(|c| matches!(c, Call::Submit { query_id, .. } if *query_id == scifi_id))
        .unwrap();

    assert!(movies_done < scifi_submitted);
    assert!(ratings_done < scifi_submitted);
}

#[tokio::test]
async fn rerunning_is_idempotent() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new();

    let first = Workflow::new(&config, &catalog).unwrap().run().await;
    let second = Workflow::new(&config, &catalog).unwrap().run().await;

    assert!(first.succeeded(), "{first}");
    assert!(second.succeeded(), "{second}");
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.route, Some(Route::CreateDatabase));
    assert_eq!(second.route, Some(Route::SkipCreation));
    assert_eq!(catalog.tables().len(), 3);
}

#[tokio::test]
async fn concurrent_runs_do_not_conflict() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new();
    let workflow = Workflow::new(&config, &catalog).unwrap();

    let (a, b) = tokio::join!(workflow.run(), workflow.run());

    assert!(a.succeeded(), "{a}");
    assert!(b.succeeded(), "{b}");
    assert_eq!(catalog.tables().len(), 3);
}

#[tokio::test]
async fn failed_database_creation_halts_the_run() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new().rejecting_submission("CREATE DATABASE");

    let report = Workflow::new(&config, &catalog).unwrap().run().await;

    assert!(!report.succeeded());
    assert_eq!(report.state_of(Step::CreateAthenaDatabase), Some(StepState::Failed));
    assert_eq!(report.state_of(Step::SkipAthenaDatabaseCreation), Some(StepState::Skipped));
    assert_eq!(
        report.state_of(Step::AthenaDatabaseChecksDone),
        Some(StepState::UpstreamFailed)
    );
    for step in [
        Step::CreateAthenaMovieTable,
        Step::CreateAthenaMovieRatings,
        Step::CreateAthenaScifiTable,
    ] {
        assert_eq!(report.state_of(step), Some(StepState::UpstreamFailed));
    }
    assert!(catalog.submitted_sql().is_empty());

    match report.into_result() {
        Err(WorkflowError::StepFailed { step, reason }) => {
            assert_eq!(step, Step::CreateAthenaDatabase);
            assert!(reason.contains("permission denied"));
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn table_failure_stops_later_tables_and_keeps_earlier_ones() {
    let config = config_from(&[("athena_db", "db1")]);
    let catalog = MockCatalog::new()
        .with_database("db1")
        .failing_execution("db1.ratings (");

    let report = Workflow::new(&config, &catalog).unwrap().run().await;

    assert_eq!(report.state_of(Step::CreateAthenaMovieTable), Some(StepState::Succeeded));
    assert_eq!(report.state_of(Step::CreateAthenaMovieRatings), Some(StepState::Failed));
    assert_eq!(
        report.state_of(Step::CreateAthenaScifiTable),
        Some(StepState::UpstreamFailed)
    );

    let failed = report.failed_step().unwrap();
    assert_eq!(failed.step, Step::CreateAthenaMovieRatings);
    assert!(failed.query_id.is_some());
    assert!(failed.error.as_deref().unwrap().contains("simulated failure"));

    // No rollback: the movies table stays.
    assert!(catalog.tables().contains("db1.movies"));
    assert!(catalog.submitted_sql().iter().all(|s| !s.contains("db1.scifi")));
}
