use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::types::{ConcurrentExecutionResult, EnhancedConcurrentResult, ErrorBreakdownEntry, Throughput};
use super::{FULL_PERCENT_X100, compute_percentiles};
use crate::domain::{ErrorKind, ExecutionId, ExecutionStatus, SingleRequestResult};

/// Identity and timing of the run being reduced.
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    pub thread_count: u32,
    pub iterations_per_thread: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

const MICROS_PER_SEC: u128 = 1_000_000;

/// Folds every attempt into the run's aggregates. Only sums, counts, and
/// sorts are used, so arrival order never changes the outcome.
#[must_use]
pub fn reduce(mut results: Vec<SingleRequestResult>, meta: &RunMeta) -> EnhancedConcurrentResult {
    results.sort_by_key(|result| (result.worker, result.sequence));

    let completed = u64::try_from(results.len()).unwrap_or(u64::MAX);
    let successful = u64::try_from(results.iter().filter(|r| r.is_success()).count())
        .unwrap_or(u64::MAX);
    let failed = completed.saturating_sub(successful);

    let durations: Vec<Duration> = results.iter().map(|r| r.elapsed).collect();
    let min_response_time = durations.iter().min().copied().unwrap_or_default();
    let max_response_time = durations.iter().max().copied().unwrap_or_default();
    let elapsed_sum: Duration = durations.iter().copied().fold(Duration::ZERO, Duration::saturating_add);
    let avg_response_time = u32::try_from(completed)
        .ok()
        .and_then(|count| elapsed_sum.checked_div(count))
        .unwrap_or_default();
    let total_bytes = results
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.response_bytes));

    let percentiles = compute_percentiles(&durations);
    let throughput = compute_throughput(&results, completed, total_bytes);
    let (success_rate_x100, failure_rate_x100) = compute_rates(successful, completed);
    let error_breakdown = compute_error_breakdown(&results, failed);

    let duration = meta
        .finished_at
        .signed_duration_since(meta.started_at)
        .to_std()
        .unwrap_or_default();
    let base = ConcurrentExecutionResult {
        execution_id: meta.execution_id.clone(),
        status: meta.status,
        started_at: meta.started_at,
        finished_at: meta.finished_at,
        duration,
        thread_count: meta.thread_count,
        iterations_per_thread: meta.iterations_per_thread,
        total_requests: u64::from(meta.thread_count)
            .saturating_mul(u64::from(meta.iterations_per_thread)),
        completed,
        successful,
        failed,
        min_response_time,
        avg_response_time,
        max_response_time,
        total_bytes,
        results,
    };

    EnhancedConcurrentResult {
        base,
        percentiles,
        throughput,
        success_rate_x100,
        failure_rate_x100,
        error_breakdown,
    }
}

fn compute_throughput(results: &[SingleRequestResult], completed: u64, total_bytes: u64) -> Throughput {
    let first_start = results.iter().map(|r| r.start_offset).min();
    let last_finish = results.iter().map(SingleRequestResult::finished_offset).max();
    let span = match (first_start, last_finish) {
        (Some(first), Some(last)) => last.saturating_sub(first),
        _ => Duration::ZERO,
    };
    let span_us = span.as_micros();
    let per_sec = |value: u128| -> u64 {
        value
            .saturating_mul(MICROS_PER_SEC)
            .checked_div(span_us)
            .map_or(0, |rate| u64::try_from(rate).unwrap_or(u64::MAX))
    };
    Throughput {
        span,
        requests_per_sec_x100: per_sec(u128::from(completed).saturating_mul(100)),
        bytes_per_sec: per_sec(u128::from(total_bytes)),
    }
}

/// Success and failure rates in hundredths of a percent. For any non-empty
/// run they add up to exactly 100%.
fn compute_rates(successful: u64, completed: u64) -> (u64, u64) {
    if completed == 0 {
        return (0, 0);
    }
    let success = scaled_share(successful, completed);
    (success, FULL_PERCENT_X100.saturating_sub(success))
}

fn scaled_share(part: u64, whole: u64) -> u64 {
    u128::from(part)
        .saturating_mul(u128::from(FULL_PERCENT_X100))
        .checked_div(u128::from(whole))
        .map_or(0, |value| u64::try_from(value).unwrap_or(u64::MAX))
}

fn compute_error_breakdown(results: &[SingleRequestResult], failed: u64) -> Vec<ErrorBreakdownEntry> {
    let mut counts: BTreeMap<ErrorKind, u64> = BTreeMap::new();
    for kind in results.iter().filter_map(|r| r.error) {
        let count = counts.entry(kind).or_insert(0);
        *count = count.saturating_add(1);
    }
    let mut entries: Vec<ErrorBreakdownEntry> = counts
        .into_iter()
        .map(|(kind, count)| ErrorBreakdownEntry {
            kind,
            count,
            percent_x100: scaled_share(count, failed),
        })
        .collect();
    entries.sort_by(|left, right| right.count.cmp(&left.count).then(left.kind.cmp(&right.kind)));
    entries
}
