// Public modules
pub mod types;
pub mod config;
pub mod parsing;
pub mod prometheus;
pub mod metrics;
pub mod collector;
pub mod report;
pub mod render;
pub mod poller;

// Re-export commonly used items
pub use types::*;
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_cpu_to_cores, parse_memory_to_bytes, parse_sample_value, format_cores, format_bytes};
pub use prometheus::{FetchError, LabeledSeries, MetricsSource, PrometheusClient, QueryScope, StaticMetricsSource};
pub use metrics::*;
pub use collector::MetricsCollector;
pub use report::{ClusterSnapshot, SnapshotSummary};
pub use render::{build_render_payload, publish_snapshot, RenderPayload};
pub use poller::{Poller, TickOutcome};
