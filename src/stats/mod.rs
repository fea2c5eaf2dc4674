//! Reduction of a run's attempts into aggregate statistics.
mod percentiles;
mod reduce;
mod types;


pub use percentiles::{Percentiles, compute_percentiles, percentile, percentile_index};
pub use reduce::{RunMeta, reduce};
pub use types::{ConcurrentExecutionResult, EnhancedConcurrentResult, ErrorBreakdownEntry, Throughput};

/// Fixed-point scale used for percentages and rates (two decimals).
pub const PERCENT_SCALE: u64 = 100;
/// A full 100% at [`PERCENT_SCALE`].
pub const FULL_PERCENT_X100: u64 = 10_000;
