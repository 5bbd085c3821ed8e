use chrono::{DateTime, Utc};

use crate::metrics::{compute_layout, ClusterTree, Jitter, Layout};
use crate::types::*;

/// Result of one poll tick. Replaced wholesale by the next successful tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot {
    pub generated_at: DateTime<Utc>,
    pub window: QueryWindow,
    pub threshold: Threshold,
    pub tree: ClusterTree,
}

impl ClusterSnapshot {
    pub fn layout<J: Jitter + ?Sized>(&self, canvas: &Canvas, jitter: &J) -> Layout {
        compute_layout(self.tree.children(), canvas, jitter)
    }

    /// Count services by their status in the newest bucket
    pub fn summary(&self) -> SnapshotSummary {
        let mut summary = SnapshotSummary {
            buckets: self.tree.len(),
            ..Default::default()
        };
        for service in self.tree.children() {
            match service.latest_status() {
                Some(HealthyStatus::Failed) => summary.failed_services.push(service.service),
                Some(HealthyStatus::Warning) => summary.warning_services.push(service.service),
                Some(HealthyStatus::Healthy) => summary.healthy_count += 1,
                Some(HealthyStatus::NoData) | None => summary.no_data_count += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSummary {
    pub buckets: usize,
    pub failed_services: Vec<Service>,
    pub warning_services: Vec<Service>,
    pub healthy_count: usize,
    pub no_data_count: usize,
}

impl SnapshotSummary {
    pub fn total_issues(&self) -> usize {
        self.failed_services.len() + self.warning_services.len()
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }
}
