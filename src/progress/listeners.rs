use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::ExecutionProgress;

/// Callback invoked with each delivered snapshot.
pub type ProgressCallback = Arc<dyn Fn(ExecutionProgress) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

#[derive(Default)]
struct RegistryState {
    slots: BTreeMap<ListenerId, mpsc::Sender<ExecutionProgress>>,
    /// Set once the final snapshot has gone out; late listeners get it
    /// straight away.
    finished: Option<ExecutionProgress>,
}

/// Listeners of one execution. Each listener owns a bounded channel drained
/// by its own dispatcher task, so callbacks never run on a worker.
pub struct ListenerRegistry {
    runtime: Handle,
    capacity: usize,
    next_id: AtomicU64,
    state: RwLock<RegistryState>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new(runtime: Handle, capacity: usize) -> Self {
        Self {
            runtime,
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn add(&self, callback: ProgressCallback) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);
        self.runtime.spawn(dispatch(id, rx, callback));

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(final_snapshot) = state.finished.clone() {
            drop(state);
            // Fresh channel, so there is room for the one snapshot.
            drop(tx.try_send(final_snapshot));
        } else {
            state.slots.insert(id, tx);
        }
        id
    }

    /// Detaches a listener. Whatever is already queued for it is still
    /// delivered once; nothing new is queued.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.slots.remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers an intermediate snapshot. A full listener queue drops it.
    pub fn publish(&self, snapshot: &ExecutionProgress) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        for tx in state.slots.values() {
            drop(tx.try_send(snapshot.clone()));
        }
    }

    /// Delivers the final snapshot to every live listener and closes their
    /// channels.
    pub async fn publish_final(&self, snapshot: ExecutionProgress) {
        let slots = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.finished.is_some() {
                return;
            }
            state.finished = Some(snapshot.clone());
            std::mem::take(&mut state.slots)
        };
        for (id, tx) in slots {
            if tx.send(snapshot.clone()).await.is_err() {
                debug!("{} stopped before the final snapshot", id);
            }
        }
    }
}

async fn dispatch(
    id: ListenerId,
    mut rx: mpsc::Receiver<ExecutionProgress>,
    callback: ProgressCallback,
) {
    let mut last_completed: Option<u64> = None;
    while let Some(snapshot) = rx.recv().await {
        let stale = last_completed.is_some_and(|last| snapshot.completed <= last);
        if stale && !snapshot.is_final {
            continue;
        }
        last_completed = Some(snapshot.completed);
        callback(snapshot);
    }
    debug!("{} dispatcher finished", id);
}
