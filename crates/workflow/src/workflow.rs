//! Executes one provisioning run.
//!
//! Steps run one at a time in [`Step::ALL`] order. Before each step its
//! trigger rule is evaluated against the recorded states of its
//! predecessors; the arm of the branch that the existence check did not
//! select is recorded as skipped as soon as the route is known.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{error, info, warn};

use scifi_athena::{AthenaError, QueryId, QueryService, QueryStep, QueryStepParams};
use scifi_core::Config;

use crate::ddl::{create_database_statement, Table, TableDefinitions};
use crate::error::WorkflowError;
use crate::report::{RunReport, StepRecord};
use crate::route::{arms_not_taken, branch_for, check_database, Route};
use crate::step::{Step, StepState};

/// What a successful step hands back to the executor.
#[derive(Debug, Default)]
struct StepEffect {
    query_id: Option<QueryId>,
    route: Option<Route>,
}

/// The provisioning DAG bound to one configuration and one query service.
pub struct Workflow<'a> {
    config: &'a Config,
    service: &'a dyn QueryService,
    tables: TableDefinitions,
}

impl<'a> Workflow<'a> {
    /// Validates the parameters and renders the table definitions up front,
    /// so configuration problems surface before any step runs.
    pub fn new(config: &'a Config, service: &'a dyn QueryService) -> Result<Self, WorkflowError> {
        config.params.validate()?;
        let tables = TableDefinitions::render(&config.params)?;
        Ok(Self {
            config,
            service,
            tables,
        })
    }

    pub fn tables(&self) -> &TableDefinitions {
        &self.tables
    }

    /// The statement submission behind `step`, for the steps that submit one.
    pub fn query_step(&self, step: Step) -> Option<QueryStep> {
        match step {
            Step::CreateAthenaDatabase => Some(self.create_database_step()),
            _ => step.table().map(|table| self.table_step(step, table)),
        }
    }

    fn create_database_step(&self) -> QueryStep {
        let params = &self.config.params;
        QueryStep::new(
            Step::CreateAthenaDatabase.task_id(),
            QueryStepParams {
                sql: create_database_statement(&params.athena_db),
                database: None,
                workgroup: params.workgroup.clone(),
                output_location: params.query_output_location(),
                // Acknowledgment only.
                wait: false,
            },
        )
    }

    fn table_step(&self, step: Step, table: Table) -> QueryStep {
        let params = &self.config.params;
        QueryStep::new(
            step.task_id(),
            QueryStepParams {
                sql: self.tables.statement(table).to_string(),
                database: Some(params.athena_db.clone()),
                workgroup: params.workgroup.clone(),
                output_location: params.step_output_location(table.output_name()),
                wait: true,
            },
        )
    }

    /// Run every step. Never returns early: a failure is recorded and the
    /// remaining steps are marked `upstream_failed`. Use
    /// [`RunReport::into_result`] to turn a failed run into an error.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::start(&self.config.dag_id, &self.config.params.athena_db);
        let mut states: HashMap<Step, StepState> = HashMap::new();

        info!(
            run_id = %report.run_id,
            dag_id = %report.dag_id,
            database = %report.database,
            "Starting provisioning run"
        );

        for step in Step::ALL {
            if let Some(state) = states.get(&step).copied() {
                info!(step = %step, state = %state, "Step not run");
                report.push(StepRecord::not_run(step, state));
                continue;
            }

            let upstream: Vec<StepState> = step
                .upstream()
                .iter()
                .filter_map(|up| states.get(up).copied())
                .collect();

            if let Some(state) = step.trigger_rule().evaluate(&upstream).as_state() {
                info!(step = %step, state = %state, "Step not run");
                states.insert(step, state);
                report.push(StepRecord::not_run(step, state));
                continue;
            }

            info!(step = %step, "Running step");
            let started = Instant::now();
            let result = self.execute_step(step).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(effect) => {
                    if let Some(route) = effect.route {
                        info!(route = %route, next = %branch_for(route), "Route selected");
                        report.route = Some(route);
                        for arm in arms_not_taken(route) {
                            states.insert(arm, StepState::Skipped);
                        }
                    }
                    states.insert(step, StepState::Succeeded);
                    report.push(StepRecord {
                        step,
                        state: StepState::Succeeded,
                        query_id: effect.query_id.map(|q| q.to_string()),
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    error!(step = %step, error = %e, "Step failed");
                    states.insert(step, StepState::Failed);
                    report.push(StepRecord {
                        step,
                        state: StepState::Failed,
                        query_id: failed_query_id(&e),
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        report.finish();
        if report.succeeded() {
            info!(run_id = %report.run_id, "Provisioning run succeeded");
        } else {
            warn!(run_id = %report.run_id, "Provisioning run failed");
        }
        report
    }

    async fn execute_step(&self, step: Step) -> Result<StepEffect, AthenaError> {
        match step {
            Step::PrintVariables => {
                self.print_variables();
                Ok(StepEffect::default())
            }
            Step::CheckAthenaDatabase => {
                let route = check_database(
                    self.service,
                    &self.config.catalog,
                    &self.config.params.athena_db,
                )
                .await;
                Ok(StepEffect {
                    route: Some(route),
                    ..Default::default()
                })
            }
            Step::SkipAthenaDatabaseCreation | Step::AthenaDatabaseChecksDone => {
                Ok(StepEffect::default())
            }
            Step::CreateAthenaDatabase => self.submit(self.create_database_step()).await,
            Step::CreateAthenaMovieTable => self.submit(self.table_step(step, Table::Movies)).await,
            Step::CreateAthenaMovieRatings => {
                self.submit(self.table_step(step, Table::Ratings)).await
            }
            Step::CreateAthenaScifiTable => self.submit(self.table_step(step, Table::Scifi)).await,
        }
    }

    async fn submit(&self, query_step: QueryStep) -> Result<StepEffect, AthenaError> {
        let receipt = query_step.execute(self.service).await?;
        Ok(StepEffect {
            query_id: Some(receipt.query_id),
            ..Default::default()
        })
    }

    fn print_variables(&self) {
        let params = &self.config.params;
        info!("Data Lake location {}", params.s3_dlake);
        info!("Data within Lake {}", params.s3_data);
        info!("New Athena DB {}", params.athena_db);
        info!("Output CSV file we create {}", params.athena_output);
    }
}

/// Execution id carried by errors raised after the statement was accepted.
fn failed_query_id(err: &AthenaError) -> Option<String> {
    match err {
        AthenaError::QueryFailed { query_id, .. }
        | AthenaError::QueryCancelled { query_id }
        | AthenaError::QueryTimeout { query_id, .. } => Some(query_id.clone()),
        _ => None,
    }
}
