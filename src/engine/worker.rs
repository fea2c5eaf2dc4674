use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use super::cancel::CancelToken;
use crate::domain::{ErrorKind, ExecutionRequest, RequestAttempt, SingleRequestResult};
use crate::error::SendError;
use crate::executor::{ExecutorResponse, RequestExecutor};
use crate::progress::ProgressAggregator;

pub(crate) struct WorkerContext {
    pub(crate) index: u32,
    pub(crate) release_delay: Duration,
    pub(crate) request: Arc<ExecutionRequest>,
    pub(crate) executor: Arc<dyn RequestExecutor>,
    pub(crate) aggregator: Arc<ProgressAggregator>,
    pub(crate) token: CancelToken,
}

/// How a worker's loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    Finished,
    /// Stopped early after `attempts` attempts.
    Cancelled { attempts: u32 },
    Fatal { reason: String },
}

/// Runs one worker's share of iterations, strictly in sequence.
pub(crate) async fn run_worker(mut ctx: WorkerContext) -> WorkerExit {
    let run_start = ctx.aggregator.run_start();
    if !wait_for_release(&mut ctx.token, run_start, ctx.release_delay).await {
        debug!("Worker {} cancelled before release", ctx.index);
        return WorkerExit::Cancelled { attempts: 0 };
    }
    debug!(
        "Worker {} released after {}ms",
        ctx.index,
        ctx.release_delay.as_millis()
    );

    let template = &ctx.request.template;
    for sequence in 0..ctx.request.iterations_per_thread {
        if ctx.token.is_cancelled() {
            debug!("Worker {} stopping after {} attempts", ctx.index, sequence);
            return WorkerExit::Cancelled { attempts: sequence };
        }

        let attempt = RequestAttempt {
            worker: ctx.index,
            sequence,
            start_offset: run_start.elapsed(),
            started_at: Utc::now(),
        };
        let clock = Instant::now();
        let outcome = if ctx.request.abort_in_flight_on_cancel {
            tokio::select! {
                biased;
                outcome = ctx.executor.send(template, template.timeout) => Some(outcome),
                () = ctx.token.cancelled() => None,
            }
        } else {
            Some(ctx.executor.send(template, template.timeout).await)
        };

        let result = match outcome {
            Some(outcome) => match record_outcome(attempt, outcome) {
                Ok(result) => result,
                Err(reason) => {
                    warn!("Worker {} hit a fatal executor error: {}", ctx.index, reason);
                    return WorkerExit::Fatal { reason };
                }
            },
            None => attempt.failed(
                ErrorKind::Cancelled,
                "Cancelled while in flight".to_owned(),
                clock.elapsed(),
            ),
        };
        ctx.aggregator.ingest(result);
    }

    debug!("Worker {} finished", ctx.index);
    WorkerExit::Finished
}

fn record_outcome(
    attempt: RequestAttempt,
    outcome: Result<ExecutorResponse, SendError>,
) -> Result<SingleRequestResult, String> {
    match outcome {
        Ok(response) => Ok(attempt.responded(
            response.status_code,
            response.body_bytes,
            response.elapsed,
        )),
        Err(SendError::Request {
            kind,
            message,
            elapsed,
        }) => Ok(attempt.failed(kind, message, elapsed)),
        Err(SendError::Unavailable { reason }) => Err(reason),
    }
}

/// Sleeps until the worker's ramp-up slot. Returns `false` if cancelled
/// first.
async fn wait_for_release(token: &mut CancelToken, run_start: Instant, delay: Duration) -> bool {
    if delay.is_zero() {
        return !token.is_cancelled();
    }
    let release_at = run_start.checked_add(delay).unwrap_or(run_start);
    tokio::select! {
        () = sleep_until(release_at) => !token.is_cancelled(),
        () = token.cancelled() => false,
    }
}
