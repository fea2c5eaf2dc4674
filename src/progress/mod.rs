//! Lock-free progress counters, the append-only result log, and listener
//! dispatch.
mod aggregator;
mod listeners;


pub use aggregator::ProgressAggregator;
pub use listeners::{ListenerId, ListenerRegistry, ProgressCallback};
