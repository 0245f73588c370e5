//! Orchestrator-level errors surfaced to callers of [`crate::orchestrator::Orchestrator`].

use pipeline_core::control::CancelledError;
use pipeline_core::runtimes::runner::RunnerError;
use pipeline_types::store::StoreError;
use thiserror::Error;

use crate::input::InputError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid workflow input: {0}")]
    Input(#[from] InputError),

    #[error("workflow cancelled")]
    Cancelled,

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("workflow engine error: {0}")]
    Runner(#[from] RunnerError),

    #[error("no such job: {job_id}")]
    JobNotFound { job_id: String },
}

impl From<CancelledError> for OrchestratorError {
    fn from(_: CancelledError) -> Self {
        OrchestratorError::Cancelled
    }
}
