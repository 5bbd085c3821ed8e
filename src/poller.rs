use chrono::Utc;
use tracing::{info, warn};

use crate::collector::MetricsCollector;
use crate::prometheus::{MetricsSource, QueryScope};
use crate::report::ClusterSnapshot;
use crate::types::{QueryWindow, Threshold, TimeRangeOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Updated,
    Retained,
}

/// Owns the last good snapshot across poll ticks.
///
/// `tick` takes `&mut self`, so a new tick cannot start while one is running.
pub struct Poller<S: MetricsSource> {
    source: S,
    scope: QueryScope,
    time_range: TimeRangeOption,
    snapshot: Option<ClusterSnapshot>,
    last_error: Option<String>,
}

impl<S: MetricsSource> Poller<S> {
    pub fn new(source: S, scope: QueryScope, time_range: TimeRangeOption) -> Self {
        Self {
            source,
            scope,
            time_range,
            snapshot: None,
            last_error: None,
        }
    }

    pub fn snapshot(&self) -> Option<&ClusterSnapshot> {
        self.snapshot.as_ref()
    }

    /// Message of the last failed tick, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_time_range(&mut self, time_range: TimeRangeOption) {
        self.time_range = time_range;
    }

    pub async fn tick(&mut self, threshold: &Threshold) -> TickOutcome {
        self.tick_at(Utc::now().timestamp_millis(), threshold).await
    }

    /// One fetch-and-compute cycle for the window ending at `now_ms`.
    pub async fn tick_at(&mut self, now_ms: i64, threshold: &Threshold) -> TickOutcome {
        let window = QueryWindow::ending_at(now_ms, &self.time_range);
        let collector = MetricsCollector::new(&self.source, &self.scope);
        match collector.collect(&window, threshold).await {
            Ok(snapshot) => {
                let summary = snapshot.summary();
                info!(
                    "snapshot over {} buckets: {} failed, {} warning",
                    summary.buckets,
                    summary.failed_services.len(),
                    summary.warning_services.len()
                );
                self.snapshot = Some(snapshot);
                self.last_error = None;
                TickOutcome::Updated
            }
            Err(e) => {
                warn!("metrics fetch failed, keeping previous snapshot: {:#}", e);
                self.last_error = Some(format!("{:#}", e));
                TickOutcome::Retained
            }
        }
    }
}
