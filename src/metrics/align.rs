use std::collections::HashMap;

use crate::types::{AlignedSeries, QueryWindow, RawSeries, Sample, FAILED, NO_DATA};

/// Align one raw series onto the window grid.
///
/// Slot `i` holds the reading at `start + i * step`. A missing slot after the
/// series' first observation is `FAILED`, before it `NO_DATA`. NaN readings
/// become 0. A malformed window yields an empty series.
pub fn align_series(raw: &[Sample], window: &QueryWindow) -> AlignedSeries {
    let len = window.len();
    if len == 0 {
        return Vec::new();
    }

    let mut by_time: HashMap<i64, f64> = HashMap::with_capacity(raw.len());
    for s in raw {
        let value = if s.value.is_nan() { 0.0 } else { s.value };
        by_time.insert(s.timestamp, value);
    }
    let min_time = raw.iter().map(|s| s.timestamp).min();

    window
        .timestamps()
        .map(|t| match (by_time.get(&t), min_time) {
            (Some(v), _) => *v,
            (None, Some(min)) if t > min => FAILED,
            _ => NO_DATA,
        })
        .collect()
}

/// Align several series on the same window; every output has the same length.
pub fn align_all(raws: &[RawSeries], window: &QueryWindow) -> Vec<AlignedSeries> {
    raws.iter().map(|r| align_series(r, window)).collect()
}

/// All-`NO_DATA` series for a name the source returned nothing for.
pub fn no_data_series(window: &QueryWindow) -> AlignedSeries {
    vec![NO_DATA; window.len()]
}
