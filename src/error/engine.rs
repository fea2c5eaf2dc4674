use thiserror::Error;

use super::ValidationErrors;
use crate::domain::{ExecutionId, ExecutionStatus};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid execution request: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Unknown execution '{id}'.")]
    UnknownExecution { id: ExecutionId },
    #[error("Execution '{id}' has not finished (status: {status}).")]
    NotTerminal {
        id: ExecutionId,
        status: ExecutionStatus,
    },
    #[error("Execution '{id}' finished without a result.")]
    ResultMissing { id: ExecutionId },
    #[error("Execution '{id}' was dropped before it finished.")]
    StatusChannelClosed { id: ExecutionId },
    #[error("Execution '{id}' failed: {reason}")]
    RunFailed { id: ExecutionId, reason: String },
    #[error("No tokio runtime available to run workers: {source}")]
    RuntimeUnavailable {
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
}
