use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    #[must_use]
    pub fn new(sequence: u64, created_at: DateTime<Utc>) -> Self {
        Self(format!("exec-{}-{}", sequence, created_at.timestamp_millis()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExecutionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ExecutionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    Running,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "Pending",
            ExecutionStatus::Running => "Running",
            ExecutionStatus::Cancelling => "Cancelling",
            ExecutionStatus::Completed => "Completed",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Cancelled => "Cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }

    /// Transitions only move forward; terminal states are final.
    #[must_use]
    pub const fn can_transition_to(self, next: ExecutionStatus) -> bool {
        match self {
            ExecutionStatus::Pending => matches!(
                next,
                ExecutionStatus::Running
                    | ExecutionStatus::Cancelling
                    | ExecutionStatus::Failed
                    | ExecutionStatus::Cancelled
            ),
            ExecutionStatus::Running => matches!(
                next,
                ExecutionStatus::Cancelling
                    | ExecutionStatus::Completed
                    | ExecutionStatus::Failed
                    | ExecutionStatus::Cancelled
            ),
            ExecutionStatus::Cancelling => {
                matches!(next, ExecutionStatus::Failed | ExecutionStatus::Cancelled)
            }
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled => {
                false
            }
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of one execution's identity and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionHandle {
    pub id: ExecutionId,
    pub created_at: DateTime<Utc>,
    pub status: ExecutionStatus,
}

/// Progress snapshot handed to listeners. Never mutated once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionProgress {
    pub execution_id: ExecutionId,
    pub total_requests: u64,
    pub completed: u64,
    pub successful: u64,
    pub failed: u64,
    pub avg_response_time_ms: u64,
    #[serde(rename = "elapsed_ms", with = "super::serde_millis")]
    pub elapsed: Duration,
    pub is_final: bool,
}
