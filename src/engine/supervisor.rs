use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::registry::ExecutionEntry;
use super::worker::WorkerExit;
use crate::domain::ExecutionStatus;
use crate::stats::{RunMeta, reduce};

/// Joins every worker, reduces the result log, and moves the execution to
/// its terminal status before sending the final snapshot.
pub(crate) async fn supervise(entry: Arc<ExecutionEntry>, mut workers: JoinSet<WorkerExit>) {
    let mut fatal: Option<String> = None;

    while let Some(joined) = workers.join_next().await {
        let exit = joined.unwrap_or_else(|err| WorkerExit::Fatal {
            reason: format!("Worker task failed: {}", err),
        });
        match exit {
            WorkerExit::Finished => {}
            WorkerExit::Cancelled { attempts } => {
                debug!("{}: worker stopped early after {} attempts", entry.id, attempts);
            }
            WorkerExit::Fatal { reason } => {
                if fatal.is_none() {
                    warn!("{}: stopping remaining workers: {}", entry.id, reason);
                    entry.signal_workers();
                    fatal = Some(reason);
                }
            }
        }
    }

    let terminal = if fatal.is_some() {
        ExecutionStatus::Failed
    } else if entry.status() == ExecutionStatus::Cancelling {
        ExecutionStatus::Cancelled
    } else {
        ExecutionStatus::Completed
    };

    let meta = RunMeta {
        execution_id: entry.id.clone(),
        status: terminal,
        thread_count: entry.request.thread_count,
        iterations_per_thread: entry.request.iterations_per_thread,
        started_at: entry.created_at,
        finished_at: Utc::now(),
    };
    let result = reduce(entry.aggregator.drain_results(), &meta);
    let (completed, total_requests, successful, failed) = (
        result.base.completed,
        result.base.total_requests,
        result.base.successful,
        result.base.failed,
    );

    match entry.finish(result, fatal) {
        Some(status) => info!(
            "{} {}: {} of {} requests ({} ok, {} failed)",
            entry.id, status, completed, total_requests, successful, failed
        ),
        None => warn!(
            "{}: could not move from {} to {}",
            entry.id,
            entry.status(),
            terminal
        ),
    }
    entry.aggregator.publish_final().await;
}
