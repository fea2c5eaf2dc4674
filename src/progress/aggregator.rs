use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

use super::listeners::{ListenerId, ListenerRegistry, ProgressCallback};
use crate::domain::{ExecutionId, ExecutionProgress, SingleRequestResult};

/// Ingestion point shared by all workers of one execution.
///
/// Counters are atomics and each worker appends to its own result shard,
/// so workers never wait on each other here.
pub struct ProgressAggregator {
    execution_id: ExecutionId,
    total_requests: u64,
    run_start: Instant,
    successful: AtomicU64,
    failed: AtomicU64,
    elapsed_sum_us: AtomicU64,
    min_publish_interval_us: u64,
    last_publish_us: AtomicU64,
    shards: Box<[Mutex<Vec<SingleRequestResult>>]>,
    listeners: ListenerRegistry,
}

impl ProgressAggregator {
    #[must_use]
    pub fn new(
        execution_id: ExecutionId,
        total_requests: u64,
        worker_count: usize,
        run_start: Instant,
        runtime: Handle,
        listener_capacity: usize,
        min_publish_interval: Duration,
    ) -> Self {
        let shards = (0..worker_count.max(1))
            .map(|_| Mutex::new(Vec::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            execution_id,
            total_requests,
            run_start,
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            elapsed_sum_us: AtomicU64::new(0),
            min_publish_interval_us: duration_us(min_publish_interval),
            last_publish_us: AtomicU64::new(0),
            shards,
            listeners: ListenerRegistry::new(runtime, listener_capacity),
        }
    }

    #[must_use]
    pub const fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    #[must_use]
    pub const fn run_start(&self) -> Instant {
        self.run_start
    }

    /// Records one attempt and offers a fresh snapshot to listeners.
    pub fn ingest(&self, result: SingleRequestResult) {
        // Counter before sum: a snapshot that sees a sample in the sum also
        // sees it counted, so the running average never reads high.
        if result.is_success() {
            self.successful.fetch_add(1, Ordering::AcqRel);
        } else {
            self.failed.fetch_add(1, Ordering::AcqRel);
        }
        self.elapsed_sum_us
            .fetch_add(duration_us(result.elapsed), Ordering::AcqRel);

        let shard_index = usize::try_from(result.worker).unwrap_or(usize::MAX);
        if let Some(shard) = self.shards.get(shard_index).or_else(|| self.shards.last()) {
            shard
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result);
        }

        if self.should_publish() {
            self.listeners.publish(&self.snapshot(false));
        }
    }

    fn should_publish(&self) -> bool {
        if self.min_publish_interval_us == 0 {
            return true;
        }
        let now_us = duration_us(self.run_start.elapsed());
        let mut last = self.last_publish_us.load(Ordering::Relaxed);
        loop {
            if now_us.saturating_sub(last) < self.min_publish_interval_us {
                return false;
            }
            match self.last_publish_us.compare_exchange_weak(
                last,
                now_us,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(current) => last = current,
            }
        }
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.successful
            .load(Ordering::Acquire)
            .saturating_add(self.failed.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn snapshot(&self, is_final: bool) -> ExecutionProgress {
        let elapsed_sum_us = self.elapsed_sum_us.load(Ordering::Acquire);
        let successful = self.successful.load(Ordering::Acquire);
        let failed = self.failed.load(Ordering::Acquire);
        let completed = successful.saturating_add(failed);
        let avg_response_time_ms = elapsed_sum_us
            .checked_div(completed)
            .map_or(0, |avg_us| avg_us / 1_000);
        ExecutionProgress {
            execution_id: self.execution_id.clone(),
            total_requests: self.total_requests,
            completed,
            successful,
            failed,
            avg_response_time_ms,
            elapsed: self.run_start.elapsed(),
            is_final,
        }
    }

    pub fn add_listener(&self, callback: ProgressCallback) -> ListenerId {
        self.listeners.add(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Takes every recorded result out of the log. Called once all workers
    /// have joined.
    #[must_use]
    pub fn drain_results(&self) -> Vec<SingleRequestResult> {
        let mut results = Vec::new();
        for shard in &self.shards {
            let mut guard = shard.lock().unwrap_or_else(PoisonError::into_inner);
            results.append(&mut guard);
        }
        results
    }

    pub async fn publish_final(&self) {
        self.listeners.publish_final(self.snapshot(true)).await;
    }
}

fn duration_us(value: Duration) -> u64 {
    u64::try_from(value.as_micros()).unwrap_or(u64::MAX)
}
