use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use crate::metrics::{align_series, build_cluster_tree, ClusterInputs};
use crate::prometheus::{
    cpu_query, memory_query, node_type_for_component, success_rate_query, LabeledSeries, MetricsSource,
    QueryScope,
};
use crate::report::ClusterSnapshot;
use crate::types::*;

/// Runs one poll tick against a metrics source
pub struct MetricsCollector<'a, S: MetricsSource> {
    source: &'a S,
    scope: &'a QueryScope,
}

#[derive(Default)]
struct PodSeries {
    node_type: Option<NodeType>,
    cpu: RawSeries,
    memory: RawSeries,
}

fn pod_name(series: &LabeledSeries) -> Option<&str> {
    series.label("pod").or_else(|| series.label("instance"))
}

fn merge_into(pods: &mut BTreeMap<String, PodSeries>, series: Vec<LabeledSeries>, cpu: bool) {
    for s in series {
        let name = match pod_name(&s) {
            Some(n) => n.to_string(),
            None => continue,
        };
        let entry = pods.entry(name).or_default();
        if entry.node_type.is_none() {
            entry.node_type = s.label("component").map(node_type_for_component);
        }
        if cpu {
            entry.cpu.extend(s.samples);
        } else {
            entry.memory.extend(s.samples);
        }
    }
}

impl<'a, S: MetricsSource> MetricsCollector<'a, S> {
    pub fn new(source: &'a S, scope: &'a QueryScope) -> Self {
        Self { source, scope }
    }

    /// Fetch and align cpu and memory of every pod of an internal service.
    ///
    /// A pod that only shows up in one metric gets an all-NO_DATA series for
    /// the other. Coordinators come first, then pods by name.
    pub async fn collect_service_pods(&self, service: Service, window: &QueryWindow) -> Result<Vec<PrometheusNode>> {
        let (cpu_q, mem_q) = match (cpu_query(self.scope, service, window), memory_query(self.scope, service)) {
            (Some(c), Some(m)) => (c, m),
            _ => return Ok(Vec::new()),
        };

        let cpu = self
            .source
            .query_range(&cpu_q, window)
            .await
            .with_context(|| format!("fetching {} cpu", service.id()))?;
        let memory = self
            .source
            .query_range(&mem_q, window)
            .await
            .with_context(|| format!("fetching {} memory", service.id()))?;

        let mut by_pod: BTreeMap<String, PodSeries> = BTreeMap::new();
        merge_into(&mut by_pod, cpu, true);
        merge_into(&mut by_pod, memory, false);
        debug!("{}: {} pods", service.id(), by_pod.len());

        let mut pods: Vec<PrometheusNode> = by_pod
            .into_iter()
            .map(|(pod, s)| PrometheusNode {
                node_type: s.node_type.unwrap_or(NodeType::Node),
                cpu: align_series(&s.cpu, window),
                memory: align_series(&s.memory, window),
                pod,
            })
            .collect();
        pods.sort_by(|a, b| {
            (a.node_type == NodeType::Node, &a.pod).cmp(&(b.node_type == NodeType::Node, &b.pod))
        });
        Ok(pods)
    }

    /// Fetch and align the success rate of a third-party dependency.
    pub async fn collect_success_rate(&self, service: Service, window: &QueryWindow) -> Result<AlignedSeries> {
        let query = match success_rate_query(self.scope, service, window) {
            Some(q) => q,
            None => return Ok(vec![NO_DATA; window.len()]),
        };
        let series = self
            .source
            .query_range(&query, window)
            .await
            .with_context(|| format!("fetching {} success rate", service.id()))?;
        let raw = series.into_iter().next().map(|s| s.samples).unwrap_or_default();
        Ok(align_series(&raw, window))
    }

    /// Fetch everything one tree needs.
    pub async fn collect_inputs(&self, window: &QueryWindow) -> Result<ClusterInputs> {
        let mut inputs = ClusterInputs::new(window.len());
        for service in Service::INTERNAL {
            let pods = self.collect_service_pods(service, window).await?;
            inputs.set_pods(service, pods);
        }
        for service in Service::THIRD_PARTY {
            let rates = self.collect_success_rate(service, window).await?;
            inputs.set_success_rate(service, rates);
        }
        Ok(inputs)
    }

    /// Run a full tick: fetch, align, classify and build the snapshot.
    pub async fn collect(&self, window: &QueryWindow, threshold: &Threshold) -> Result<ClusterSnapshot> {
        let inputs = self.collect_inputs(window).await?;
        let tree = build_cluster_tree(inputs, threshold);
        Ok(ClusterSnapshot {
            generated_at: Utc::now(),
            window: *window,
            threshold: *threshold,
            tree,
        })
    }
}
