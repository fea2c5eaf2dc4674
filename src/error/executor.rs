use std::time::Duration;

use thiserror::Error;

use crate::domain::ErrorKind;

/// Failure returned by a single-request executor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The attempt failed; the run goes on.
    #[error("{kind}: {message}")]
    Request {
        kind: ErrorKind,
        message: String,
        elapsed: Duration,
    },
    /// The executor cannot serve any request for this run.
    #[error("Executor unavailable: {reason}")]
    Unavailable { reason: String },
}

impl SendError {
    #[must_use]
    pub fn request(kind: ErrorKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self::Request {
            kind,
            message: message.into(),
            elapsed,
        }
    }
}
