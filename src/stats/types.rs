use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Percentiles;
use crate::domain::{ErrorKind, ExecutionId, ExecutionStatus, SingleRequestResult};

/// The frozen set of attempts of one run plus plain totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcurrentExecutionResult {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", with = "crate::domain::serde_millis")]
    pub duration: Duration,
    pub thread_count: u32,
    pub iterations_per_thread: u32,
    pub total_requests: u64,
    pub completed: u64,
    pub successful: u64,
    pub failed: u64,
    #[serde(rename = "min_response_time_ms", with = "crate::domain::serde_millis")]
    pub min_response_time: Duration,
    #[serde(rename = "avg_response_time_ms", with = "crate::domain::serde_millis")]
    pub avg_response_time: Duration,
    #[serde(rename = "max_response_time_ms", with = "crate::domain::serde_millis")]
    pub max_response_time: Duration,
    pub total_bytes: u64,
    pub results: Vec<SingleRequestResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Throughput {
    /// Wall-clock span from the first request start to the last completion.
    #[serde(rename = "span_ms", with = "crate::domain::serde_millis")]
    pub span: Duration,
    pub requests_per_sec_x100: u64,
    pub bytes_per_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBreakdownEntry {
    pub kind: ErrorKind,
    pub count: u64,
    /// Share of failed attempts, in hundredths of a percent.
    pub percent_x100: u64,
}

/// Derived statistics of one run, computed once at its end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedConcurrentResult {
    pub base: ConcurrentExecutionResult,
    pub percentiles: Percentiles,
    pub throughput: Throughput,
    pub success_rate_x100: u64,
    pub failure_rate_x100: u64,
    pub error_breakdown: Vec<ErrorBreakdownEntry>,
}

impl EnhancedConcurrentResult {
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.base.status
    }

    #[must_use]
    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        self.error_breakdown
            .iter()
            .find(|entry| entry.kind == kind)
            .map_or(0, |entry| entry.count)
    }
}
