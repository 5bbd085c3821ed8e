use crate::types::{AlignedSeries, HealthyStatus, PrometheusNode, Service, Threshold};
use super::classify::{classify_external_series, classify_internal_series};
use super::tree::{PodNode, ServiceOverview};

/// Roll up statuses of one bucket: failed, then warning, then healthy, else no data.
pub fn rollup_status<I>(statuses: I) -> HealthyStatus
where
    I: IntoIterator<Item = HealthyStatus>,
{
    let (mut warning, mut healthy) = (false, false);
    for s in statuses {
        match s {
            HealthyStatus::Failed => return HealthyStatus::Failed,
            HealthyStatus::Warning => warning = true,
            HealthyStatus::Healthy => healthy = true,
            HealthyStatus::NoData => {}
        }
    }
    if warning {
        HealthyStatus::Warning
    } else if healthy {
        HealthyStatus::Healthy
    } else {
        HealthyStatus::NoData
    }
}

/// Classify every pod of an internal service and build its overview.
///
/// `len` is the shared bucket count; the overview's status at `i` only reads
/// the pods' statuses at `i`.
pub fn aggregate_service(
    service: Service,
    pods: Vec<PrometheusNode>,
    len: usize,
    threshold: &Threshold,
) -> ServiceOverview {
    let children: Vec<PodNode> = pods
        .into_iter()
        .map(|p| PodNode {
            service,
            healthy_status: classify_internal_series(&p.cpu, &p.memory, threshold),
            node_type: p.node_type,
            pod: p.pod,
            cpu: p.cpu,
            memory: p.memory,
        })
        .collect();

    let healthy_status = (0..len)
        .map(|i| rollup_status(children.iter().filter_map(|c| c.healthy_status.get(i).copied())))
        .collect();

    ServiceOverview::new(service, healthy_status, children)
}

/// Overview of a third-party dependency from its success-rate series.
pub fn aggregate_external(service: Service, rates: &AlignedSeries) -> ServiceOverview {
    ServiceOverview::new(service, classify_external_series(rates), Vec::new())
}
