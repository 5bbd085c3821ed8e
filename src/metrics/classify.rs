use crate::types::{HealthyStatus, Threshold, EXTERNAL_HEALTHY_RATE, FAILED, NO_DATA};

/// Classify one internal (coordinator/worker) bucket.
///
/// Only cpu carries the sentinels; memory is compared as-is. Comparisons are
/// inclusive, and a NaN threshold never triggers a warning.
pub fn classify_internal(cpu: f64, memory: f64, threshold: &Threshold) -> HealthyStatus {
    if cpu == NO_DATA {
        HealthyStatus::NoData
    } else if cpu == FAILED {
        HealthyStatus::Failed
    } else if cpu >= threshold.cpu || memory >= threshold.memory {
        HealthyStatus::Warning
    } else {
        HealthyStatus::Healthy
    }
}

/// Classify one third-party success-rate bucket. There is no warning state.
pub fn classify_external(rate: f64) -> HealthyStatus {
    if rate == NO_DATA {
        HealthyStatus::NoData
    } else if rate > EXTERNAL_HEALTHY_RATE {
        HealthyStatus::Healthy
    } else {
        HealthyStatus::Failed
    }
}

/// Per-bucket internal statuses. A shorter memory series reads as 0.
pub fn classify_internal_series(cpu: &[f64], memory: &[f64], threshold: &Threshold) -> Vec<HealthyStatus> {
    cpu.iter()
        .enumerate()
        .map(|(i, c)| classify_internal(*c, memory.get(i).copied().unwrap_or(0.0), threshold))
        .collect()
}

pub fn classify_external_series(rates: &[f64]) -> Vec<HealthyStatus> {
    rates.iter().map(|r| classify_external(*r)).collect()
}
