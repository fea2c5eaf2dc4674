//! Request templates, execution identity, and per-attempt records.
mod execution;
mod request;
mod result;
pub(crate) mod serde_millis;

#[cfg(test)]
mod tests;

pub use execution::{ExecutionHandle, ExecutionId, ExecutionProgress, ExecutionStatus};
pub use request::{
    ExecutionRequest, HttpMethod, MAX_ITERATIONS_PER_THREAD, MAX_RAMP_UP_SECONDS,
    MAX_THREAD_COUNT, MAX_TOTAL_REQUESTS, MIN_ITERATIONS_PER_THREAD, MIN_THREAD_COUNT,
    RequestTemplate,
};
pub use result::{ErrorKind, RequestAttempt, SingleRequestResult};
