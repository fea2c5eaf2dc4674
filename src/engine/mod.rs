//! Execution coordinator: validation, ramp-up scheduling, the worker pool,
//! cancellation, and lifecycle tracking.
mod cancel;
mod config;
mod registry;
mod schedule;
mod supervisor;
mod worker;


use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::info;

use crate::domain::{
    ExecutionHandle, ExecutionId, ExecutionProgress, ExecutionRequest, ExecutionStatus,
};
use crate::error::EngineError;
use crate::executor::RequestExecutor;
use crate::progress::{ListenerId, ProgressAggregator, ProgressCallback};
use crate::stats::EnhancedConcurrentResult;

pub use cancel::{CancelSignal, CancelToken};
pub use config::{DEFAULT_LISTENER_CAPACITY, EngineConfig};
pub use schedule::ramp_up_schedule;

use registry::{ExecutionEntry, ExecutionRegistry};
use supervisor::supervise;
use worker::{WorkerContext, run_worker};

/// Runs load executions against a [`RequestExecutor`] and tracks them by id.
///
/// Workers and listener dispatchers run on the tokio runtime that was
/// current when [`LoadEngine::start`] was called.
pub struct LoadEngine {
    executor: Arc<dyn RequestExecutor>,
    config: EngineConfig,
    registry: ExecutionRegistry,
}

impl LoadEngine {
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self::with_config(executor, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(executor: Arc<dyn RequestExecutor>, config: EngineConfig) -> Self {
        Self {
            executor,
            config,
            registry: ExecutionRegistry::default(),
        }
    }

    /// Validates `request` and starts it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] listing every violated rule, or
    /// [`EngineError::RuntimeUnavailable`] when called outside a tokio
    /// runtime.
    pub fn start(&self, request: ExecutionRequest) -> Result<ExecutionId, EngineError> {
        self.launch(request, None).map(|(id, _)| id)
    }

    /// Like [`LoadEngine::start`], but registers `callback` before any
    /// worker runs so no snapshot is missed.
    ///
    /// # Errors
    ///
    /// Same as [`LoadEngine::start`].
    pub fn start_with_listener<F>(
        &self,
        request: ExecutionRequest,
        callback: F,
    ) -> Result<(ExecutionId, ListenerId), EngineError>
    where
        F: Fn(ExecutionProgress) + Send + Sync + 'static,
    {
        let callback: ProgressCallback = Arc::new(callback);
        let (id, listener) = self.launch(request, Some(callback))?;
        let listener = listener.ok_or_else(|| EngineError::UnknownExecution { id: id.clone() })?;
        Ok((id, listener))
    }

    fn launch(
        &self,
        request: ExecutionRequest,
        callback: Option<ProgressCallback>,
    ) -> Result<(ExecutionId, Option<ListenerId>), EngineError> {
        request.validate()?;
        let runtime =
            Handle::try_current().map_err(|source| EngineError::RuntimeUnavailable { source })?;

        let created_at = Utc::now();
        let id = self.registry.next_id(created_at);
        let request = Arc::new(request);
        let aggregator = Arc::new(ProgressAggregator::new(
            id.clone(),
            request.total_requests(),
            usize::try_from(request.thread_count).unwrap_or(usize::MAX),
            Instant::now(),
            runtime.clone(),
            self.config.listener_capacity,
            self.config.min_publish_interval,
        ));
        let listener = callback.map(|callback| aggregator.add_listener(callback));

        let entry = Arc::new(ExecutionEntry::new(
            id.clone(),
            created_at,
            Arc::clone(&request),
            Arc::clone(&aggregator),
            CancelSignal::new(),
        ));
        let token = entry
            .cancel_token()
            .ok_or_else(|| EngineError::UnknownExecution { id: id.clone() })?;
        self.registry.insert(Arc::clone(&entry));
        entry.transition(ExecutionStatus::Running);

        info!(
            "{} started: {} x {} {} {} (ramp-up {}s)",
            id,
            request.thread_count,
            request.iterations_per_thread,
            request.template.method.as_str(),
            request.template.url,
            request.ramp_up_seconds
        );

        let mut workers = JoinSet::new();
        let schedule = ramp_up_schedule(request.thread_count, request.ramp_up_seconds);
        for (index, release_delay) in (0u32..).zip(schedule) {
            let context = WorkerContext {
                index,
                release_delay,
                request: Arc::clone(&request),
                executor: Arc::clone(&self.executor),
                aggregator: Arc::clone(&aggregator),
                token: token.clone(),
            };
            workers.spawn_on(run_worker(context), &runtime);
        }
        runtime.spawn(supervise(entry, workers));

        Ok((id, listener))
    }

    /// Registers a progress listener for a known execution. Listeners added
    /// after the run ended receive the final snapshot once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownExecution`] for unknown ids.
    pub fn add_progress_listener<F>(
        &self,
        id: &ExecutionId,
        callback: F,
    ) -> Result<ListenerId, EngineError>
    where
        F: Fn(ExecutionProgress) + Send + Sync + 'static,
    {
        let entry = self.entry(id)?;
        Ok(entry.aggregator.add_listener(Arc::new(callback)))
    }

    /// Removes a listener. Returns `Ok(false)` if it was not registered.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownExecution`] for unknown ids.
    pub fn remove_progress_listener(
        &self,
        id: &ExecutionId,
        listener: ListenerId,
    ) -> Result<bool, EngineError> {
        let entry = self.entry(id)?;
        Ok(entry.aggregator.remove_listener(listener))
    }

    /// Requests cooperative cancellation. Returns `false` for unknown ids
    /// and for runs that are already cancelling or finished.
    pub fn cancel(&self, id: &ExecutionId) -> bool {
        let cancelled = self
            .registry
            .get(id)
            .is_some_and(|entry| entry.request_cancel());
        if cancelled {
            info!("{} cancellation requested", id);
        }
        cancelled
    }

    #[must_use]
    pub fn status(&self, id: &ExecutionId) -> Option<ExecutionStatus> {
        self.registry.get(id).map(|entry| entry.status())
    }

    #[must_use]
    pub fn handle(&self, id: &ExecutionId) -> Option<ExecutionHandle> {
        self.registry.get(id).map(|entry| entry.handle())
    }

    /// Current counters of a run, built on demand.
    #[must_use]
    pub fn progress(&self, id: &ExecutionId) -> Option<ExecutionProgress> {
        self.registry.get(id).map(|entry| {
            entry
                .aggregator
                .snapshot(entry.status().is_terminal())
        })
    }

    /// Why a `Failed` run failed.
    #[must_use]
    pub fn failure_reason(&self, id: &ExecutionId) -> Option<String> {
        self.registry
            .get(id)
            .and_then(|entry| entry.failure().map(str::to_owned))
    }

    /// Ids of every execution still held by the engine.
    #[must_use]
    pub fn executions(&self) -> Vec<ExecutionId> {
        self.registry.ids()
    }

    /// Statistics of a finished run. Repeated calls return the same value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownExecution`] for unknown ids and
    /// [`EngineError::NotTerminal`] while the run is still going.
    pub fn result(&self, id: &ExecutionId) -> Result<EnhancedConcurrentResult, EngineError> {
        let entry = self.entry(id)?;
        Self::terminal_result(&entry)
    }

    /// Waits for a run to finish and returns its statistics.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownExecution`] for unknown ids.
    pub async fn wait(&self, id: &ExecutionId) -> Result<EnhancedConcurrentResult, EngineError> {
        let entry = self.entry(id)?;
        let mut status_rx = entry.subscribe_status();
        status_rx
            .wait_for(|status| status.is_terminal())
            .await
            .map_err(|_closed| EngineError::StatusChannelClosed { id: id.clone() })?;
        Self::terminal_result(&entry)
    }

    /// Drops a finished run and its cached result.
    pub fn forget(&self, id: &ExecutionId) -> bool {
        self.registry.remove_terminal(id)
    }

    fn entry(&self, id: &ExecutionId) -> Result<Arc<ExecutionEntry>, EngineError> {
        self.registry
            .get(id)
            .ok_or_else(|| EngineError::UnknownExecution { id: id.clone() })
    }

    fn terminal_result(entry: &ExecutionEntry) -> Result<EnhancedConcurrentResult, EngineError> {
        let status = entry.status();
        if !status.is_terminal() {
            return Err(EngineError::NotTerminal {
                id: entry.id.clone(),
                status,
            });
        }
        entry
            .result()
            .cloned()
            .ok_or_else(|| EngineError::ResultMissing {
                id: entry.id.clone(),
            })
    }
}
