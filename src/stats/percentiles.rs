use std::time::Duration;

use serde::Serialize;

use super::PERCENT_SCALE;

const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P95: u64 = 95;
const PERCENTILE_P99: u64 = 99;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    #[serde(rename = "p50_ms", with = "crate::domain::serde_millis")]
    pub p50: Duration,
    #[serde(rename = "p95_ms", with = "crate::domain::serde_millis")]
    pub p95: Duration,
    #[serde(rename = "p99_ms", with = "crate::domain::serde_millis")]
    pub p99: Duration,
}

/// Index of the `pct`-th percentile in a sorted set of `len` samples:
/// `ceil(pct * len / 100) - 1`, clamped to the valid range.
#[must_use]
pub fn percentile_index(len: usize, pct: u64) -> usize {
    if len == 0 {
        return 0;
    }
    let len_u64 = u64::try_from(len).unwrap_or(u64::MAX);
    let rank = pct
        .saturating_mul(len_u64)
        .div_ceil(PERCENT_SCALE)
        .saturating_sub(1);
    usize::try_from(rank)
        .unwrap_or(usize::MAX)
        .min(len.saturating_sub(1))
}

/// Percentile of an ascending slice. Empty input yields zero.
#[must_use]
pub fn percentile(sorted: &[Duration], pct: u64) -> Duration {
    sorted
        .get(percentile_index(sorted.len(), pct))
        .copied()
        .unwrap_or_default()
}

#[must_use]
pub fn compute_percentiles(durations: &[Duration]) -> Percentiles {
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();
    Percentiles {
        p50: percentile(&sorted, PERCENTILE_P50),
        p95: percentile(&sorted, PERCENTILE_P95),
        p99: percentile(&sorted, PERCENTILE_P99),
    }
}
