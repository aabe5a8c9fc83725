use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::route::Route;
use crate::step::{Step, StepState};

/// Outcome of one step within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub state: StepState,
    /// Athena execution id for steps that submitted a statement.
    pub query_id: Option<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl StepRecord {
    /// Record for a step that was never executed.
    pub fn not_run(step: Step, state: StepState) -> Self {
        Self {
            step,
            state,
            query_id: None,
            duration_ms: 0,
            error: None,
        }
    }
}

/// Everything that happened during one provisioning run.
///
/// Each run is an independent instance keyed by `run_id`; nothing here is
/// persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub dag_id: String,
    pub database: String,
    /// Set once the existence check has run.
    pub route: Option<Route>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn start(dag_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dag_id: dag_id.into(),
            database: database.into(),
            route: None,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::with_capacity(Step::ALL.len()),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn record(&self, step: Step) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn state_of(&self, step: Step) -> Option<StepState> {
        self.record(step).map(|r| r.state)
    }

    /// The step that failed, if any. At most one step fails per run.
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.state == StepState::Failed)
    }

    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|r| !r.state.is_failure())
    }

    /// Steps that actually executed, in execution order.
    pub fn executed(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|r| matches!(r.state, StepState::Succeeded | StepState::Failed))
            .map(|r| r.step)
            .collect()
    }

    /// Turn a failed run into [`WorkflowError::StepFailed`].
    pub fn into_result(self) -> Result<Self, WorkflowError> {
        match self.failed_step() {
            Some(failed) => Err(WorkflowError::StepFailed {
                step: failed.step,
                reason: failed.error.clone().unwrap_or_else(|| "unknown".into()),
            }),
            None => Ok(self),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run {} ({}) database={} route={}",
            self.run_id,
            self.dag_id,
            self.database,
            self.route.map(|r| r.as_str()).unwrap_or("-"),
        )?;

        let headers = ["step", "state", "query_id", "ms"];
        let rows: Vec<[String; 4]> = self
            .steps
            .iter()
            .map(|r| {
                [
                    r.step.task_id().to_string(),
                    r.state.to_string(),
                    r.query_id.clone().unwrap_or_else(|| "-".into()),
                    r.duration_ms.to_string(),
                ]
            })
            .collect();

        // Column widths (minimum = header length).
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        for (i, h) in headers.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", h, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{:<width$}", cell, width = widths[i])?;
            }
            writeln!(f)?;
        }

        if let Some(failed) = self.failed_step() {
            writeln!(
                f,
                "\nfailed at {}: {}",
                failed.step,
                failed.error.as_deref().unwrap_or("unknown")
            )?;
        }

        Ok(())
    }
}
