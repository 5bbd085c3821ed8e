use std::collections::HashMap;

use crate::types::{
    AlignedSeries, HealthyStatus, NodeType, PrometheusNode, Service, Threshold, NO_DATA, OVERVIEW_LABEL,
};
use super::aggregate::{aggregate_external, aggregate_service};

/// Leaf: one pod with its own statuses and raw series for drill-down.
#[derive(Debug, Clone, PartialEq)]
pub struct PodNode {
    pub service: Service,
    pub node_type: NodeType,
    pub pod: String,
    pub healthy_status: Vec<HealthyStatus>,
    pub cpu: AlignedSeries,
    pub memory: AlignedSeries,
}

/// Per-service rollup. Third-party dependencies have no children.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOverview {
    pub service: Service,
    pub label: String,
    pub healthy_status: Vec<HealthyStatus>,
    children: Vec<PodNode>,
}

impl ServiceOverview {
    /// Pods of a third-party dependency are dropped; those only carry a rollup.
    pub(crate) fn new(service: Service, healthy_status: Vec<HealthyStatus>, children: Vec<PodNode>) -> Self {
        let children = if service.is_third_party() { Vec::new() } else { children };
        Self {
            service,
            label: service.label().to_string(),
            healthy_status,
            children,
        }
    }

    pub fn children(&self) -> &[PodNode] {
        &self.children
    }

    /// True when any child is a worker rather than the coordinator itself.
    pub fn has_workers(&self) -> bool {
        self.children.iter().any(|c| c.node_type == NodeType::Node)
    }

    pub fn latest_status(&self) -> Option<HealthyStatus> {
        self.healthy_status.last().copied()
    }
}

/// Root of the overview. It only groups services and is never classified.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTree {
    children: Vec<ServiceOverview>,
}

impl ClusterTree {
    pub fn label(&self) -> &'static str {
        OVERVIEW_LABEL
    }

    /// Always empty.
    pub fn healthy_status(&self) -> &[HealthyStatus] {
        &[]
    }

    pub fn children(&self) -> &[ServiceOverview] {
        &self.children
    }

    pub fn service(&self, service: Service) -> Option<&ServiceOverview> {
        self.children.iter().find(|c| c.service == service)
    }

    /// Bucket count shared by every status array in the tree.
    pub fn len(&self) -> usize {
        self.children.first().map(|c| c.healthy_status.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aligned inputs of one pass, keyed by service.
#[derive(Debug, Clone, Default)]
pub struct ClusterInputs {
    len: usize,
    pods: HashMap<Service, Vec<PrometheusNode>>,
    success_rates: HashMap<Service, AlignedSeries>,
}

impl ClusterInputs {
    pub fn new(len: usize) -> Self {
        Self { len, ..Default::default() }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn with_pods(mut self, service: Service, pods: Vec<PrometheusNode>) -> Self {
        self.set_pods(service, pods);
        self
    }

    pub fn set_pods(&mut self, service: Service, pods: Vec<PrometheusNode>) -> &mut Self {
        self.pods.insert(service, pods);
        self
    }

    pub fn with_success_rate(mut self, service: Service, rates: AlignedSeries) -> Self {
        self.set_success_rate(service, rates);
        self
    }

    pub fn set_success_rate(&mut self, service: Service, rates: AlignedSeries) -> &mut Self {
        self.success_rates.insert(service, rates);
        self
    }
}

/// Compose the "Overview" tree: internal services first, then third-party
/// dependencies, always in `Service` order. A dependency without a series is
/// reported as no data.
pub fn build_cluster_tree(mut inputs: ClusterInputs, threshold: &Threshold) -> ClusterTree {
    let len = inputs.len;
    let mut children = Vec::with_capacity(Service::INTERNAL.len() + Service::THIRD_PARTY.len());

    for service in Service::INTERNAL {
        let pods = inputs.pods.remove(&service).unwrap_or_default();
        children.push(aggregate_service(service, pods, len, threshold));
    }
    for service in Service::THIRD_PARTY {
        let rates = inputs
            .success_rates
            .remove(&service)
            .unwrap_or_else(|| vec![NO_DATA; len]);
        children.push(aggregate_external(service, &rates));
    }

    ClusterTree { children }
}
