use thiserror::Error;

use scifi_core::ConfigError;

use crate::step::Step;

/// Errors that can occur building or running the provisioning workflow.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("DDL template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A step failed; later steps were not run.
    #[error("Step {step} failed: {reason}")]
    StepFailed { step: Step, reason: String },
}
