//! Concurrent HTTP load-execution engine.
//!
//! [`engine::LoadEngine`] fans one request template out over a pool of
//! workers, streams progress to listeners, supports cooperative
//! cancellation, and reduces every attempt into percentile, throughput, and
//! error statistics. The `loadbench` binary drives a single run from the
//! command line.
pub mod args;
pub mod config;
pub mod domain;
pub mod engine;
pub mod entry;
pub mod error;
pub mod executor;
pub mod progress;
pub mod report;
pub mod stats;
mod system;
