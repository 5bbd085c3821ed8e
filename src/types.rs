use serde::Serialize;

/// Sentinel for a slot before the instance started reporting.
pub const NO_DATA: f64 = -1.0;
/// Sentinel for a slot missing after the instance started reporting.
pub const FAILED: f64 = -2.0;

/// Success rate above which a third-party dependency counts as up.
pub const EXTERNAL_HEALTHY_RATE: f64 = 0.95;

pub const OVERVIEW_LABEL: &str = "Overview";

#[derive(Debug, Clone)]
pub struct Config {
    pub prometheus_address: String,
    pub prometheus_instance: String,
    pub prometheus_namespace: String,
    pub threshold: Threshold,
    pub time_range: TimeRangeOption,
    pub poll_interval_secs: u64,
    pub canvas: Canvas,
    pub jitter_seed: Option<u64>,
    pub snapshot_webhook_url: Option<String>,
}

/// Health of one node or service at one time bucket.
///
/// The ordinal doubles as the UI severity color index. Rollup precedence is
/// a separate rule, see `metrics::aggregate::rollup_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthyStatus {
    NoData = 0,
    Healthy = 1,
    Warning = 2,
    Failed = 3,
}

impl HealthyStatus {
    pub const ALL: [HealthyStatus; 4] = [
        HealthyStatus::NoData,
        HealthyStatus::Healthy,
        HealthyStatus::Warning,
        HealthyStatus::Failed,
    ];

    pub fn severity(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthyStatus::NoData => "no data",
            HealthyStatus::Healthy => "healthy",
            HealthyStatus::Warning => "warning",
            HealthyStatus::Failed => "failed",
        }
    }
}

/// Usage limits for internal pods: cpu in cores, memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub cpu: f64,
    pub memory: f64,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            cpu: 1.0,
            memory: 8.0 * 1024.0 * 1024.0 * 1024.0,
        }
    }
}

/// One raw observation; timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

pub type RawSeries = Vec<Sample>;

/// Fixed-step series on the shared grid; slots hold readings or sentinels.
pub type AlignedSeries = Vec<f64>;

/// Logical services shown in the overview, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Root,
    Index,
    Query,
    Data,
    Meta,
    MsgStream,
    ObjStorage,
}

impl Service {
    pub const INTERNAL: [Service; 4] = [Service::Root, Service::Index, Service::Query, Service::Data];
    pub const THIRD_PARTY: [Service; 3] = [Service::Meta, Service::MsgStream, Service::ObjStorage];

    pub fn id(self) -> &'static str {
        match self {
            Service::Root => "root",
            Service::Index => "index",
            Service::Query => "query",
            Service::Data => "data",
            Service::Meta => "meta",
            Service::MsgStream => "msgstream",
            Service::ObjStorage => "objstorage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Service::Root => "Root Coord",
            Service::Index => "Index",
            Service::Query => "Query",
            Service::Data => "Data",
            Service::Meta => "Meta",
            Service::MsgStream => "MsgStream",
            Service::ObjStorage => "ObjStorage",
        }
    }

    pub fn is_third_party(self) -> bool {
        Self::THIRD_PARTY.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Coord,
    Node,
}

/// One instance of an internal service with its aligned usage.
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusNode {
    pub node_type: NodeType,
    pub pod: String,
    pub cpu: AlignedSeries,
    pub memory: AlignedSeries,
}

/// Selectable dashboard window; all values in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRangeOption {
    pub label: &'static str,
    pub window_ms: i64,
    pub step_ms: i64,
}

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

pub const TIME_RANGE_OPTIONS: [TimeRangeOption; 4] = [
    TimeRangeOption { label: "1h", window_ms: HOUR_MS, step_ms: 3 * MINUTE_MS },
    TimeRangeOption { label: "6h", window_ms: 6 * HOUR_MS, step_ms: 15 * MINUTE_MS },
    TimeRangeOption { label: "24h", window_ms: 24 * HOUR_MS, step_ms: HOUR_MS },
    TimeRangeOption { label: "7d", window_ms: 7 * 24 * HOUR_MS, step_ms: 8 * HOUR_MS },
];

impl TimeRangeOption {
    pub fn find(label: &str) -> Option<TimeRangeOption> {
        TIME_RANGE_OPTIONS.iter().copied().find(|o| o.label == label)
    }
}

impl Default for TimeRangeOption {
    fn default() -> Self {
        TIME_RANGE_OPTIONS[0]
    }
}

/// The (start, end, step) every series of one pass is aligned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl QueryWindow {
    pub fn new(start: i64, end: i64, step: i64) -> Self {
        Self { start, end, step }
    }

    /// Window of `option` ending at `now_ms` floored to the step grid.
    pub fn ending_at(now_ms: i64, option: &TimeRangeOption) -> Self {
        let end = now_ms - now_ms.rem_euclid(option.step_ms.max(1));
        Self::new(end.saturating_sub(option.window_ms), end, option.step_ms)
    }

    pub fn is_valid(&self) -> bool {
        self.end >= self.start && self.step > 0
    }

    /// Bucket count L; zero for a malformed window.
    pub fn len(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        let buckets = (self.end as i128 - self.start as i128) / self.step as i128;
        usize::try_from(buckets)
            .ok()
            .and_then(|n| n.checked_add(1))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map(move |i| (self.start as i128 + i as i128 * self.step as i128) as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0 }
    }
}
