use std::time::Duration;

/// Default bound of each listener's snapshot queue.
pub const DEFAULT_LISTENER_CAPACITY: usize = 64;

/// Engine-wide tuning shared by every execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Snapshots queued per listener before intermediate ones are dropped.
    pub listener_capacity: usize,
    /// Minimum gap between intermediate snapshots; zero publishes on every
    /// ingested result.
    pub min_publish_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            listener_capacity: DEFAULT_LISTENER_CAPACITY,
            min_publish_interval: Duration::ZERO,
        }
    }
}
