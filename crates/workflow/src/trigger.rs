//! Trigger rules: when a step may run given the states of its predecessors.
//!
//! The join after the existence-check branch needs [`TriggerRule::NoneFailed`]:
//! exactly one arm of the branch ever runs, so waiting for every predecessor
//! to succeed would never be satisfied.

use serde::{Deserialize, Serialize};

use crate::step::StepState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerRule {
    /// Every predecessor succeeded. A skipped predecessor skips this step.
    AllSuccess,
    /// No predecessor that ran has failed. Skipped predecessors are ignored.
    NoneFailed,
}

/// Outcome of evaluating a trigger rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Run,
    Skip,
    UpstreamFailed,
}

impl Readiness {
    /// State recorded for a step that does not run.
    pub fn as_state(self) -> Option<StepState> {
        match self {
            Readiness::Run => None,
            Readiness::Skip => Some(StepState::Skipped),
            Readiness::UpstreamFailed => Some(StepState::UpstreamFailed),
        }
    }
}

impl TriggerRule {
    /// Evaluate against the terminal states of all predecessors.
    pub fn evaluate(self, upstream: &[StepState]) -> Readiness {
        if upstream.iter().any(|s| s.is_failure()) {
            return Readiness::UpstreamFailed;
        }
        match self {
            TriggerRule::AllSuccess if upstream.contains(&StepState::Skipped) => Readiness::Skip,
            TriggerRule::AllSuccess | TriggerRule::NoneFailed => Readiness::Run,
        }
    }
}
