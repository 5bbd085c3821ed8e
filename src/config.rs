use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use crate::parsing::{parse_cpu_to_cores, parse_memory_to_bytes};
use crate::types::{Canvas, Config, Threshold, TimeRangeOption};

/// Source of the `PROMETHEUS_*`, `THRESHOLD_*` and layout variables.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory variables so config loading can be tested without touching the process env.
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

fn parse_or<E: EnvironmentProvider>(env: &E, key: &str, default: f64) -> f64 {
    env.get_var(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .unwrap_or(default)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let prometheus_address = env.get_var("PROMETHEUS_ADDRESS")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("PROMETHEUS_ADDRESS env var must be set"))?;

    let prometheus_instance = env.get_var("PROMETHEUS_INSTANCE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("PROMETHEUS_INSTANCE env var must be set"))?;

    let prometheus_namespace = env.get_var("PROMETHEUS_NAMESPACE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "default".to_string());

    let defaults = Threshold::default();
    let cpu = match env.get_var("THRESHOLD_CPU") {
        Some(v) => parse_cpu_to_cores(&v).with_context(|| format!("Invalid THRESHOLD_CPU: {}", v))?,
        None => defaults.cpu,
    };
    let memory = match env.get_var("THRESHOLD_MEMORY") {
        Some(v) => parse_memory_to_bytes(&v).with_context(|| format!("Invalid THRESHOLD_MEMORY: {}", v))?,
        None => defaults.memory,
    };

    let time_range = match env.get_var("TIME_RANGE") {
        Some(label) => TimeRangeOption::find(label.trim())
            .with_context(|| format!("Invalid TIME_RANGE: {}", label))?,
        None => TimeRangeOption::default(),
    };

    let poll_interval_secs: u64 = env.get_var("POLL_INTERVAL_SECONDS")
        .unwrap_or_else(|| "30".to_string())
        .parse()
        .ok()
        .filter(|v| *v > 0)
        .unwrap_or(30);

    let canvas_defaults = Canvas::default();
    let canvas = Canvas {
        width: parse_or(env, "CANVAS_WIDTH", canvas_defaults.width),
        height: parse_or(env, "CANVAS_HEIGHT", canvas_defaults.height),
    };

    let jitter_seed = match env.get_var("JITTER_SEED") {
        Some(v) => Some(v.trim().parse::<u64>().context("Invalid JITTER_SEED")?),
        None => None,
    };

    let snapshot_webhook_url = env.get_var("SNAPSHOT_WEBHOOK_URL").filter(|s| !s.trim().is_empty());

    Ok(Config {
        prometheus_address,
        prometheus_instance,
        prometheus_namespace,
        threshold: Threshold { cpu, memory },
        time_range,
        poll_interval_secs,
        canvas,
        jitter_seed,
        snapshot_webhook_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> MockEnvironment {
        MockEnvironment::new()
            .with_var("PROMETHEUS_ADDRESS", "http://prometheus:9090")
            .with_var("PROMETHEUS_INSTANCE", "my-release")
    }

    #[test]
    fn test_config_loading_with_env() {
        let env = base_env()
            .with_var("PROMETHEUS_NAMESPACE", "milvus")
            .with_var("THRESHOLD_CPU", "1500m")
            .with_var("THRESHOLD_MEMORY", "4Gi")
            .with_var("TIME_RANGE", "24h")
            .with_var("POLL_INTERVAL_SECONDS", "10")
            .with_var("CANVAS_WIDTH", "1024")
            .with_var("CANVAS_HEIGHT", "768")
            .with_var("JITTER_SEED", "42")
            .with_var("SNAPSHOT_WEBHOOK_URL", "http://renderer/snapshots");

        let config = load_config_with_env(&env).unwrap();

        assert_eq!(config.prometheus_address, "http://prometheus:9090");
        assert_eq!(config.prometheus_instance, "my-release");
        assert_eq!(config.prometheus_namespace, "milvus");
        assert_eq!(config.threshold.cpu, 1.5);
        assert_eq!(config.threshold.memory, 4.0 * 1024.0 * 1024.0 * 1024.0);
        assert_eq!(config.time_range.label, "24h");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.canvas, Canvas { width: 1024.0, height: 768.0 });
        assert_eq!(config.jitter_seed, Some(42));
        assert_eq!(config.snapshot_webhook_url.as_deref(), Some("http://renderer/snapshots"));
    }

    #[test]
    fn test_config_loading_defaults() {
        let config = load_config_with_env(&base_env()).unwrap();

        assert_eq!(config.prometheus_namespace, "default");
        assert_eq!(config.threshold, Threshold::default());
        assert_eq!(config.time_range.label, "1h");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.canvas, Canvas::default());
        assert_eq!(config.jitter_seed, None);
        assert_eq!(config.snapshot_webhook_url, None);
    }

    #[test]
    fn test_config_loading_missing_required() {
        let env = MockEnvironment::new().with_var("PROMETHEUS_INSTANCE", "my-release");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PROMETHEUS_ADDRESS"));

        let env = MockEnvironment::new().with_var("PROMETHEUS_ADDRESS", "http://prometheus:9090");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PROMETHEUS_INSTANCE"));

        let env = base_env().with_var("PROMETHEUS_ADDRESS", "   ");
        assert!(load_config_with_env(&env).is_err());
    }

    #[test]
    fn test_config_loading_invalid_thresholds() {
        let env = base_env().with_var("THRESHOLD_CPU", "lots");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("THRESHOLD_CPU"));

        let env = base_env().with_var("THRESHOLD_MEMORY", "8Xi");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("THRESHOLD_MEMORY"));
    }

    #[test]
    fn test_config_loading_invalid_time_range() {
        let env = base_env().with_var("TIME_RANGE", "2h");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TIME_RANGE"));
    }

    #[test]
    fn test_numeric_parsing_with_invalid_values() {
        let env = base_env()
            .with_var("POLL_INTERVAL_SECONDS", "soon")
            .with_var("CANVAS_WIDTH", "wide")
            .with_var("CANVAS_HEIGHT", "-5");

        let config = load_config_with_env(&env).unwrap();
        assert_eq!(config.poll_interval_secs, 30); // default fallback
        assert_eq!(config.canvas, Canvas::default()); // default fallback

        let env = base_env().with_var("JITTER_SEED", "abc");
        assert!(load_config_with_env(&env).is_err());
    }
}
