use std::time::Duration;

/// Release delay of each worker relative to run start.
///
/// Worker `k` starts at `k * (ramp_up_seconds * 1000 / thread_count)` ms;
/// without ramp-up every worker starts at once.
#[must_use]
pub fn ramp_up_schedule(thread_count: u32, ramp_up_seconds: u32) -> Vec<Duration> {
    let step_ms = u64::from(ramp_up_seconds)
        .saturating_mul(1_000)
        .checked_div(u64::from(thread_count))
        .unwrap_or(0);
    (0..u64::from(thread_count))
        .map(|index| Duration::from_millis(index.saturating_mul(step_ms)))
        .collect()
}
