//! The steps of the provisioning DAG and their dependency edges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ddl::Table;
use crate::trigger::TriggerRule;

/// One node of the provisioning DAG. Serialized as its task id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PrintVariables,
    CheckAthenaDatabase,
    SkipAthenaDatabaseCreation,
    CreateAthenaDatabase,
    AthenaDatabaseChecksDone,
    CreateAthenaMovieTable,
    CreateAthenaMovieRatings,
    CreateAthenaScifiTable,
}

impl Step {
    /// All steps in topological order. The executor walks this list as is.
    pub const ALL: [Step; 8] = [
        Step::PrintVariables,
        Step::CheckAthenaDatabase,
        Step::SkipAthenaDatabaseCreation,
        Step::CreateAthenaDatabase,
        Step::AthenaDatabaseChecksDone,
        Step::CreateAthenaMovieTable,
        Step::CreateAthenaMovieRatings,
        Step::CreateAthenaScifiTable,
    ];

    pub fn task_id(self) -> &'static str {
        match self {
            Step::PrintVariables => "print_variables",
            Step::CheckAthenaDatabase => "check_athena_database",
            Step::SkipAthenaDatabaseCreation => "skip_athena_database_creation",
            Step::CreateAthenaDatabase => "create_athena_database",
            Step::AthenaDatabaseChecksDone => "athena_database_checks_done",
            Step::CreateAthenaMovieTable => "create_athena_movie_table",
            Step::CreateAthenaMovieRatings => "create_athena_movie_ratings",
            Step::CreateAthenaScifiTable => "create_athena_scifi_table",
        }
    }

    /// Direct predecessors.
    pub fn upstream(self) -> &'static [Step] {
        match self {
            Step::PrintVariables => &[],
            Step::CheckAthenaDatabase => &[Step::PrintVariables],
            Step::SkipAthenaDatabaseCreation | Step::CreateAthenaDatabase => {
                &[Step::CheckAthenaDatabase]
            }
            Step::AthenaDatabaseChecksDone => {
                &[Step::SkipAthenaDatabaseCreation, Step::CreateAthenaDatabase]
            }
            Step::CreateAthenaMovieTable => &[Step::AthenaDatabaseChecksDone],
            // Ratings does not read movies; the edge only serializes the two.
            Step::CreateAthenaMovieRatings => &[Step::CreateAthenaMovieTable],
            Step::CreateAthenaScifiTable => &[Step::CreateAthenaMovieRatings],
        }
    }

    pub fn trigger_rule(self) -> TriggerRule {
        match self {
            Step::SkipAthenaDatabaseCreation | Step::AthenaDatabaseChecksDone => {
                TriggerRule::NoneFailed
            }
            _ => TriggerRule::AllSuccess,
        }
    }

    /// The table a step creates, if it is one of the DDL steps.
    pub fn table(self) -> Option<Table> {
        match self {
            Step::CreateAthenaMovieTable => Some(Table::Movies),
            Step::CreateAthenaMovieRatings => Some(Table::Ratings),
            Step::CreateAthenaScifiTable => Some(Table::Scifi),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_id())
    }
}

/// Terminal state of a step within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Succeeded,
    /// Not taken: the other branch arm was selected.
    Skipped,
    Failed,
    /// Not run because a predecessor failed.
    UpstreamFailed,
}

impl StepState {
    pub fn is_failure(self) -> bool {
        matches!(self, StepState::Failed | StepState::UpstreamFailed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepState::Succeeded => "succeeded",
            StepState::Skipped => "skipped",
            StepState::Failed => "failed",
            StepState::UpstreamFailed => "upstream_failed",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
