use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::parsing::parse_sample_value;
use crate::types::{NodeType, QueryWindow, RawSeries, Sample, Service};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metrics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("metrics source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("metrics query failed ({error_type}): {message}")]
    Api { error_type: String, message: String },
    #[error("unexpected result type '{0}', expected 'matrix'")]
    UnexpectedResultType(String),
    #[error("invalid sample value '{0}'")]
    Decode(String),
}

/// One returned series and the labels identifying it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabeledSeries {
    pub labels: BTreeMap<String, String>,
    pub samples: RawSeries,
}

impl LabeledSeries {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

/// Source of range-vector samples; every call of one pass shares a window.
pub trait MetricsSource {
    fn query_range(
        &self,
        query: &str,
        window: &QueryWindow,
    ) -> impl Future<Output = Result<Vec<LabeledSeries>, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct PromResponse {
    status: String,
    #[serde(default)]
    data: Option<PromData>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: Vec<MatrixResult>,
}

#[derive(Debug, Deserialize)]
struct MatrixResult {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

/// Client for the Prometheus HTTP `query_range` API.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    address: String,
}

impl PrometheusClient {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

fn millis_to_seconds(ms: i64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

impl MetricsSource for PrometheusClient {
    async fn query_range(&self, query: &str, window: &QueryWindow) -> Result<Vec<LabeledSeries>, FetchError> {
        debug!("query_range {} [{}..{} step {}ms]", query, window.start, window.end, window.step);
        let url = format!("{}/api/v1/query_range", self.address);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("query", query.to_string()),
                ("start", millis_to_seconds(window.start)),
                ("end", millis_to_seconds(window.end)),
                ("step", millis_to_seconds(window.step)),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        let parsed: PromResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(_) if !status.is_success() => {
                return Err(FetchError::Status { status: status.as_u16(), body });
            }
            Err(e) => return Err(FetchError::Decode(e.to_string())),
        };
        if parsed.status != "success" {
            return Err(FetchError::Api {
                error_type: parsed.error_type.unwrap_or_else(|| "unknown".to_string()),
                message: parsed.error.unwrap_or_default(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        let data = match parsed.data {
            Some(d) => d,
            None => return Ok(Vec::new()),
        };
        if data.result_type != "matrix" {
            return Err(FetchError::UnexpectedResultType(data.result_type));
        }
        data.result.into_iter().map(into_labeled_series).collect()
    }
}

fn into_labeled_series(result: MatrixResult) -> Result<LabeledSeries, FetchError> {
    let samples = result
        .values
        .into_iter()
        .map(|(ts, raw)| -> Result<Sample, FetchError> {
            let value = parse_sample_value(&raw).ok_or(FetchError::Decode(raw))?;
            Ok(Sample::new((ts * 1000.0).round() as i64, value))
        })
        .collect::<Result<RawSeries, _>>()?;
    Ok(LabeledSeries { labels: result.metric, samples })
}

/// Fixed responses keyed by query text; unknown queries return nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsSource {
    responses: HashMap<String, Vec<LabeledSeries>>,
}

impl StaticMetricsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, query: impl Into<String>, series: Vec<LabeledSeries>) -> Self {
        self.responses.insert(query.into(), series);
        self
    }
}

impl MetricsSource for StaticMetricsSource {
    async fn query_range(&self, query: &str, _window: &QueryWindow) -> Result<Vec<LabeledSeries>, FetchError> {
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}

/// Label filter shared by every query of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryScope {
    pub instance: String,
    pub namespace: String,
}

impl QueryScope {
    fn selector(&self, extra: &str) -> String {
        format!(
            "{{app_kubernetes_io_instance=\"{}\",namespace=\"{}\"{}}}",
            self.instance, self.namespace, extra
        )
    }
}

/// Prometheus `component` label values of an internal service, coordinator first.
pub fn components(service: Service) -> &'static [&'static str] {
    match service {
        Service::Root => &["rootcoord"],
        Service::Index => &["indexcoord", "indexnode"],
        Service::Query => &["querycoord", "querynode"],
        Service::Data => &["datacoord", "datanode"],
        Service::Meta | Service::MsgStream | Service::ObjStorage => &[],
    }
}

pub fn node_type_for_component(component: &str) -> NodeType {
    if component.ends_with("coord") {
        NodeType::Coord
    } else {
        NodeType::Node
    }
}

fn component_matcher(service: Service) -> Option<String> {
    let names = components(service);
    if names.is_empty() {
        return None;
    }
    Some(format!(",component=~\"{}\"", names.join("|")))
}

fn range_secs(window: &QueryWindow) -> i64 {
    (window.step / 1000).max(1)
}

/// Per-pod cpu usage in cores.
pub fn cpu_query(scope: &QueryScope, service: Service, window: &QueryWindow) -> Option<String> {
    let matcher = component_matcher(service)?;
    Some(format!(
        "rate(process_cpu_seconds_total{}[{}s])",
        scope.selector(&matcher),
        range_secs(window)
    ))
}

/// Per-pod resident memory in bytes.
pub fn memory_query(scope: &QueryScope, service: Service) -> Option<String> {
    let matcher = component_matcher(service)?;
    Some(format!("process_resident_memory_bytes{}", scope.selector(&matcher)))
}

/// Success ratio of a third-party dependency's operations.
pub fn success_rate_query(scope: &QueryScope, service: Service, window: &QueryWindow) -> Option<String> {
    let metric = match service {
        Service::Meta => "milvus_meta_op_count",
        Service::MsgStream => "milvus_msgstream_op_count",
        Service::ObjStorage => "milvus_storage_op_count",
        _ => return None,
    };
    let secs = range_secs(window);
    Some(format!(
        "sum(increase({metric}{}[{secs}s])) / sum(increase({metric}{}[{secs}s]))",
        scope.selector(",status=\"success\""),
        scope.selector(",status=\"total\""),
    ))
}
