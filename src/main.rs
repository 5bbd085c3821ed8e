use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use cluster_health_overview::{
    build_render_payload, load_config, publish_snapshot, Config, Poller, PrometheusClient, QueryScope,
    SeededJitter, TickOutcome,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!(
        "polling {} for instance {} in namespace {} every {}s ({} window)",
        cfg.prometheus_address,
        cfg.prometheus_instance,
        cfg.prometheus_namespace,
        cfg.poll_interval_secs,
        cfg.time_range.label
    );

    // Fixed for the process lifetime so the diagram does not move between ticks
    let jitter = SeededJitter::new(cfg.jitter_seed.unwrap_or_else(rand::random));

    let source = PrometheusClient::new(cfg.prometheus_address.clone());
    let scope = QueryScope {
        instance: cfg.prometheus_instance.clone(),
        namespace: cfg.prometheus_namespace.clone(),
    };
    let mut poller = Poller::new(source, scope, cfg.time_range);

    let mut ticker = interval(Duration::from_secs(cfg.poll_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }

        let outcome = tokio::select! {
            outcome = poller.tick(&cfg.threshold) => outcome,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down, discarding in-flight tick");
                break;
            }
        };
        if outcome == TickOutcome::Retained {
            continue;
        }

        if let Some(snapshot) = poller.snapshot() {
            let summary = snapshot.summary();
            if summary.has_issues() {
                info!(
                    "{} services unhealthy: failed {:?}, warning {:?}",
                    summary.total_issues(),
                    summary.failed_services,
                    summary.warning_services
                );
            }
            let layout = snapshot.layout(&cfg.canvas, &jitter);
            let payload = build_render_payload(snapshot, &layout);
            emit(&cfg, &payload).await;
        }
    }

    Ok(())
}

async fn emit(cfg: &Config, payload: &cluster_health_overview::RenderPayload) {
    match &cfg.snapshot_webhook_url {
        Some(url) => {
            if let Err(e) = publish_snapshot(url, payload).await {
                error!("failed to publish snapshot: {:#}", e);
            }
        }
        None => match serde_json::to_string(payload) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("failed to serialize snapshot: {}", e),
        },
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
