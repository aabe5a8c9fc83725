//! Idempotent provisioning of the movielens Athena database.
//!
//! This crate provides:
//! - `Step` / `TriggerRule`: the fixed DAG and its join semantics
//! - `Route` and `route_for_lookup`: the existence-check branch
//! - `TableDefinitions`: the three rendered DDL statements
//! - `Workflow`: executes one run against a `QueryService` and returns a `RunReport`

pub mod ddl;
pub mod error;
pub mod report;
pub mod route;
pub mod step;
pub mod trigger;
pub mod workflow;

pub use ddl::{create_database_statement, Table, TableDefinitions};
pub use error::WorkflowError;
pub use report::{RunReport, StepRecord};
pub use route::{arms_not_taken, branch_for, check_database, route_for_lookup, Route, BRANCH_TABLE};
pub use step::{Step, StepState};
pub use trigger::{Readiness, TriggerRule};
pub use workflow::Workflow;
