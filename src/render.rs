use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::metrics::{ClusterTree, Layout, LayoutKey, PodNode, Point, ServiceOverview};
use crate::parsing::{format_bytes, format_cores};
use crate::report::ClusterSnapshot;
use crate::types::{HealthyStatus, QueryWindow, Service, Threshold, FAILED, NO_DATA};

/// Everything the presentation layer draws for one snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub generated_at: DateTime<Utc>,
    pub window: QueryWindow,
    pub tree: Value,
    pub charts: Vec<PodCharts>,
    pub legend: Vec<LegendEntry>,
    pub layout: Vec<LayoutEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodCharts {
    pub service: Service,
    pub pod: String,
    pub cpu: ChartSeries,
    pub memory: ChartSeries,
}

/// One line chart. Sentinel slots are `null` so the line breaks there.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub unit: &'static str,
    pub values: Vec<Option<f64>>,
    pub latest: Option<String>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LegendEntry {
    pub status: HealthyStatus,
    pub label: &'static str,
    pub severity: u8,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LayoutEntry {
    pub kind: &'static str,
    pub service: Service,
    pub x: f64,
    pub y: f64,
}

fn is_sentinel(v: f64) -> bool {
    v == NO_DATA || v == FAILED
}

pub fn chart_series(values: &[f64], unit: &'static str, format: fn(f64) -> String, threshold: Option<f64>) -> ChartSeries {
    let values: Vec<Option<f64>> = values.iter().map(|v| if is_sentinel(*v) { None } else { Some(*v) }).collect();
    let latest = values.iter().rev().flatten().next().map(|v| format(*v));
    ChartSeries { unit, values, latest, threshold }
}

fn pod_charts(pod: &PodNode, threshold: &Threshold) -> PodCharts {
    PodCharts {
        service: pod.service,
        pod: pod.pod.clone(),
        cpu: chart_series(&pod.cpu, "cores", format_cores, Some(threshold.cpu)),
        memory: chart_series(&pod.memory, "bytes", format_bytes, Some(threshold.memory)),
    }
}

fn pod_json(pod: &PodNode) -> Value {
    json!({
        "service": pod.service,
        "type": pod.node_type,
        "label": pod.pod,
        "healthyStatus": pod.healthy_status,
        "cpu": pod.cpu,
        "memory": pod.memory,
        "children": [],
    })
}

fn service_json(service: &ServiceOverview) -> Value {
    json!({
        "service": service.service,
        "type": "overview",
        "label": service.label,
        "healthyStatus": service.healthy_status,
        "children": service.children().iter().map(pod_json).collect::<Vec<_>>(),
    })
}

/// Tree in the renderer's node structure, root first.
pub fn tree_json(tree: &ClusterTree) -> Value {
    json!({
        "service": "overview",
        "type": "overview",
        "label": tree.label(),
        "healthyStatus": tree.healthy_status(),
        "children": tree.children().iter().map(service_json).collect::<Vec<_>>(),
    })
}

pub fn legend() -> Vec<LegendEntry> {
    HealthyStatus::ALL
        .iter()
        .map(|s| LegendEntry { status: *s, label: s.label(), severity: s.severity() })
        .collect()
}

pub fn build_render_payload(snapshot: &ClusterSnapshot, layout: &Layout) -> RenderPayload {
    let charts = snapshot
        .tree
        .children()
        .iter()
        .flat_map(|s| s.children().iter())
        .map(|p| pod_charts(p, &snapshot.threshold))
        .collect();
    let layout = layout
        .iter()
        .map(|(key, Point { x, y })| {
            let (kind, service) = match key {
                LayoutKey::Overview(s) => ("overview", *s),
                LayoutKey::AggregateWorker(s) => ("aggregateWorker", *s),
            };
            LayoutEntry { kind, service, x: *x, y: *y }
        })
        .collect();

    RenderPayload {
        generated_at: snapshot.generated_at,
        window: snapshot.window,
        tree: tree_json(&snapshot.tree),
        charts,
        legend: legend(),
        layout,
    }
}

pub async fn publish_snapshot(webhook_url: &str, payload: &RenderPayload) -> Result<()> {
    let client = reqwest::Client::new();
    let res = client
        .post(webhook_url)
        .json(payload)
        .send()
        .await
        .context("Failed to send snapshot")?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        error!("Snapshot webhook failed: {} - {}", status, body);
        return Err(anyhow!("Snapshot webhook returned non-success status"));
    }
    Ok(())
}
