use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::cancel::{CancelSignal, CancelToken};
use crate::domain::{ExecutionHandle, ExecutionId, ExecutionRequest, ExecutionStatus};
use crate::progress::ProgressAggregator;
use crate::stats::EnhancedConcurrentResult;

/// Everything the engine keeps for one execution, from `start` until it is
/// forgotten.
pub(crate) struct ExecutionEntry {
    pub(crate) id: ExecutionId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) request: Arc<ExecutionRequest>,
    pub(crate) aggregator: Arc<ProgressAggregator>,
    status: watch::Sender<ExecutionStatus>,
    cancel: Mutex<Option<CancelSignal>>,
    result: OnceLock<EnhancedConcurrentResult>,
    failure: OnceLock<String>,
}

impl ExecutionEntry {
    pub(crate) fn new(
        id: ExecutionId,
        created_at: DateTime<Utc>,
        request: Arc<ExecutionRequest>,
        aggregator: Arc<ProgressAggregator>,
        cancel: CancelSignal,
    ) -> Self {
        let (status, _rx) = watch::channel(ExecutionStatus::Pending);
        Self {
            id,
            created_at,
            request,
            aggregator,
            status,
            cancel: Mutex::new(Some(cancel)),
            result: OnceLock::new(),
            failure: OnceLock::new(),
        }
    }

    pub(crate) fn status(&self) -> ExecutionStatus {
        *self.status.borrow()
    }

    pub(crate) fn subscribe_status(&self) -> watch::Receiver<ExecutionStatus> {
        self.status.subscribe()
    }

    pub(crate) fn handle(&self) -> ExecutionHandle {
        ExecutionHandle {
            id: self.id.clone(),
            created_at: self.created_at,
            status: self.status(),
        }
    }

    /// Moves the status forward. Refuses backwards or out-of-terminal moves.
    pub(crate) fn transition(&self, next: ExecutionStatus) -> bool {
        self.status.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn cancel_token(&self) -> Option<CancelToken> {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(CancelSignal::token)
    }

    /// Tells every worker to stop without touching the status.
    pub(crate) fn signal_workers(&self) -> bool {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(CancelSignal::cancel)
    }

    /// User-requested cancellation: Pending/Running → Cancelling, then
    /// signal workers.
    pub(crate) fn request_cancel(&self) -> bool {
        if !self.transition(ExecutionStatus::Cancelling) {
            return false;
        }
        self.signal_workers();
        true
    }

    /// Stores the reduced result and moves to the terminal status as one
    /// step, so a terminal status always has a result. A run that was
    /// cancelled after the result was reduced ends as `Cancelled`, not
    /// `Completed`. Returns the status the run ended in, or `None` when it
    /// was already terminal.
    pub(crate) fn finish(
        &self,
        mut result: EnhancedConcurrentResult,
        failure: Option<String>,
    ) -> Option<ExecutionStatus> {
        if let Some(reason) = failure {
            drop(self.failure.set(reason));
        }
        drop(self.cancel.lock().unwrap_or_else(PoisonError::into_inner).take());

        let mut reached = None;
        self.status.send_if_modified(|current| {
            let terminal = match (*current, result.status()) {
                (ExecutionStatus::Cancelling, ExecutionStatus::Completed) => {
                    ExecutionStatus::Cancelled
                }
                (_, requested) => requested,
            };
            if !current.can_transition_to(terminal) {
                return false;
            }
            result.base.status = terminal;
            drop(self.result.set(result));
            *current = terminal;
            reached = Some(terminal);
            true
        });
        reached
    }

    pub(crate) fn result(&self) -> Option<&EnhancedConcurrentResult> {
        self.result.get()
    }

    pub(crate) fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }
}

/// Executions known to one engine instance, keyed by id.
#[derive(Default)]
pub(crate) struct ExecutionRegistry {
    entries: RwLock<HashMap<ExecutionId, Arc<ExecutionEntry>>>,
    next_sequence: AtomicU64,
}

impl ExecutionRegistry {
    pub(crate) fn next_id(&self, created_at: DateTime<Utc>) -> ExecutionId {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        ExecutionId::new(sequence, created_at)
    }

    pub(crate) fn insert(&self, entry: Arc<ExecutionEntry>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.id.clone(), entry);
    }

    pub(crate) fn get(&self, id: &ExecutionId) -> Option<Arc<ExecutionEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Drops a finished execution. Running ones are kept.
    pub(crate) fn remove_terminal(&self, id: &ExecutionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let terminal = entries
            .get(id)
            .is_some_and(|entry| entry.status().is_terminal());
        if terminal {
            entries.remove(id);
        }
        terminal
    }

    pub(crate) fn ids(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<ExecutionId> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}
