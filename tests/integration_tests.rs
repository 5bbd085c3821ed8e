use cluster_health_overview::{
    align_all, align_series, build_cluster_tree, classify_internal, compute_layout, load_config_with_env,
    rollup_status, ClusterInputs, HealthyStatus, MetricsCollector, MockEnvironment, NodeType, NoJitter,
    PrometheusNode, QueryScope, QueryWindow, Sample, SeededJitter, Service, StaticMetricsSource, Threshold,
    FAILED, NO_DATA,
};
use cluster_health_overview::prometheus::{cpu_query, memory_query, LabeledSeries};
use cluster_health_overview::render::build_render_payload;
use cluster_health_overview::types::Canvas;
use cluster_health_overview::LayoutKey;

use HealthyStatus::*;

#[test]
fn test_aligned_length_matches_window() {
    let raws = vec![
        vec![Sample::new(0, 1.0), Sample::new(7_000, 2.0)],
        Vec::new(),
        vec![Sample::new(250, 3.0)],
    ];
    for (start, end, step) in [(0, 0, 1), (0, 10_000, 1_000), (0, 10_999, 1_000), (500, 9_000, 700), (-3_000, 3_000, 3_000)] {
        let window = QueryWindow::new(start, end, step);
        let expected = ((end - start) / step) as usize + 1;
        for aligned in align_all(&raws, &window) {
            assert_eq!(aligned.len(), expected, "window {:?}", window);
        }
    }
}

#[test]
fn test_sentinel_correctness() {
    let raw = vec![Sample::new(5_000, 0.4), Sample::new(9_000, 0.8)];
    let aligned = align_series(&raw, &QueryWindow::new(0, 10_000, 1_000));

    assert!(aligned[..5].iter().all(|v| *v == NO_DATA));
    assert_eq!(aligned[5], 0.4);
    assert_eq!(&aligned[6..9], &[FAILED, FAILED, FAILED]);
    assert_eq!(aligned[9], 0.8);
    assert_eq!(aligned[10], FAILED);
}

#[test]
fn test_empty_series_never_failed() {
    for window in [QueryWindow::new(0, 10_000, 1_000), QueryWindow::new(42, 42, 5)] {
        let aligned = align_series(&[], &window);
        assert_eq!(aligned.len(), window.len());
        assert!(aligned.iter().all(|v| *v == NO_DATA));
    }
}

#[test]
fn test_malformed_window_degrades_to_empty() {
    let raw = vec![Sample::new(0, 1.0)];
    assert!(align_series(&raw, &QueryWindow::new(10, 0, 1)).is_empty());
    assert!(align_series(&raw, &QueryWindow::new(0, 10, 0)).is_empty());
}

#[test]
fn test_classification_boundary() {
    let threshold = Threshold { cpu: 2.0, memory: 4096.0 };
    assert_eq!(classify_internal(2.0, 0.0, &threshold), Warning);
    assert_eq!(classify_internal(0.0, 4096.0, &threshold), Warning);
    assert_eq!(classify_internal(1.0, 4095.0, &threshold), Healthy);
}

#[test]
fn test_rollup_precedence() {
    assert_eq!(rollup_status([Healthy, Warning, NoData]), Warning);
    assert_eq!(rollup_status([Healthy, Warning, Failed]), Failed);
    assert_eq!(rollup_status([NoData, Failed, NoData]), Failed);
}

#[test]
fn test_tree_shape_is_fixed() {
    let tree = build_cluster_tree(ClusterInputs::new(5), &Threshold::default());
    assert_eq!(tree.children().len(), 7);
    let ids: Vec<&str> = tree.children().iter().map(|c| c.service.id()).collect();
    assert_eq!(ids, vec!["root", "index", "query", "data", "meta", "msgstream", "objstorage"]);
    assert_eq!(tree.label(), "Overview");
    assert!(tree.healthy_status().is_empty());
    assert!(tree.children().iter().all(|c| c.healthy_status.len() == 5));
}

#[test]
fn test_end_to_end_query_workers() {
    let threshold = Threshold { cpu: 0.9, memory: f64::MAX };
    let pods = vec![
        PrometheusNode {
            node_type: NodeType::Node,
            pod: "querynode-0".to_string(),
            cpu: vec![0.5, 0.9],
            memory: vec![0.0, 0.0],
        },
        PrometheusNode {
            node_type: NodeType::Node,
            pod: "querynode-1".to_string(),
            cpu: vec![0.2, 0.95],
            memory: vec![0.0, 0.0],
        },
    ];
    let tree = build_cluster_tree(ClusterInputs::new(2).with_pods(Service::Query, pods), &threshold);

    let query = tree.service(Service::Query).unwrap();
    assert_eq!(query.children()[0].healthy_status, vec![Healthy, Warning]);
    assert_eq!(query.children()[1].healthy_status, vec![Healthy, Warning]);
    assert_eq!(query.healthy_status, vec![Healthy, Warning]);
}

#[test]
fn test_full_tick_from_raw_samples() {
    let scope = QueryScope { instance: "milvus".to_string(), namespace: "default".to_string() };
    let window = QueryWindow::new(0, 1_000, 1_000);
    let worker = |pod: &str, values: &[(i64, f64)]| LabeledSeries {
        labels: [("pod", pod), ("component", "querynode")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        samples: values.iter().map(|(t, v)| Sample::new(*t, *v)).collect(),
    };
    let source = StaticMetricsSource::new()
        .with_response(
            cpu_query(&scope, Service::Query, &window).unwrap(),
            vec![
                worker("querynode-0", &[(0, 0.5), (1_000, 0.9)]),
                worker("querynode-1", &[(0, 0.2), (1_000, 0.95)]),
            ],
        )
        .with_response(memory_query(&scope, Service::Query).unwrap(), Vec::new());

    let collector = MetricsCollector::new(&source, &scope);
    let threshold = Threshold { cpu: 0.9, memory: 1e12 };
    let snapshot = tokio_test::block_on(collector.collect(&window, &threshold)).unwrap();

    let query = snapshot.tree.service(Service::Query).unwrap();
    assert_eq!(query.healthy_status, vec![Healthy, Warning]);
    assert!(query.has_workers());
    assert_eq!(snapshot.summary().warning_services, vec![Service::Query]);

    let layout = snapshot.layout(&Canvas::default(), &SeededJitter::new(3));
    assert!(layout.contains_key(&LayoutKey::AggregateWorker(Service::Query)));
    let payload = build_render_payload(&snapshot, &layout);
    assert_eq!(payload.charts.len(), 2);
    assert_eq!(payload.tree["children"].as_array().unwrap().len(), 7);
}

#[test]
fn test_layout_is_reproducible_for_a_seed() {
    let pods = vec![PrometheusNode {
        node_type: NodeType::Node,
        pod: "datanode-0".to_string(),
        cpu: vec![0.1],
        memory: vec![0.0],
    }];
    let tree = build_cluster_tree(ClusterInputs::new(1).with_pods(Service::Data, pods), &Threshold::default());
    let canvas = Canvas { width: 640.0, height: 480.0 };

    let a = compute_layout(tree.children(), &canvas, &SeededJitter::new(99));
    let b = compute_layout(tree.children(), &canvas, &SeededJitter::new(99));
    assert_eq!(a, b);

    let plain = compute_layout(tree.children(), &canvas, &NoJitter);
    assert_eq!(
        plain[&LayoutKey::Overview(Service::Data)],
        a[&LayoutKey::Overview(Service::Data)]
    );
}

#[test]
fn test_config_environment_isolation() {
    let empty_env = MockEnvironment::new();
    assert!(load_config_with_env(&empty_env).is_err());

    let env = MockEnvironment::new()
        .with_var("PROMETHEUS_ADDRESS", "http://localhost:9090")
        .with_var("PROMETHEUS_INSTANCE", "milvus")
        .with_var("THRESHOLD_CPU", "900m");
    let config = load_config_with_env(&env).unwrap();
    assert_eq!(config.threshold.cpu, 0.9);
    assert_eq!(config.prometheus_namespace, "default");
}
