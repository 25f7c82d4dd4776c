//! End-to-end scoring scenarios through the public library API.

use noderisk::analysis::{HealthPredictor, RuleSet, Severity, Status};
use noderisk::config::{AppConfig, EngineConfig};
use noderisk::metrics::{History, Sample};

fn node(cpu: f64, mem_pct: f64, latency: f64, utilization: f64) -> Sample {
    Sample {
        cpu_usage: cpu,
        cpu_idle: 100.0 - cpu,
        memory_used: mem_pct,
        memory_total: 100.0,
        network_latency_ms: latency,
        utilization_score: utilization,
        peer_count: 4,
        uptime_secs: 86_400,
        ..Sample::default()
    }
}

#[test]
fn scenario_idle_node() {
    let history = vec![node(20.0, 20.0, 1.0, 10.0); 12];
    let p = HealthPredictor::default().predict(&history);

    assert_eq!(p.status, Status::Healthy);
    assert_eq!(p.failure_probability, 3);
    assert!(p.issues.is_empty());
    assert_eq!(p.time_to_failure, None);
}

#[test]
fn scenario_cpu_climb() {
    let history: Vec<Sample> = (0..12)
        .map(|i| node(60.0 + i as f64, 30.0, 1.0, 70.0))
        .collect();
    let p = HealthPredictor::default().predict(&history);

    assert_ne!(p.status, Status::Healthy);
    assert!(p.issues.iter().any(|i| i.severity == Severity::Low));
    assert!(p.issues.iter().any(|i| i.severity == Severity::Medium));
    assert!(p.time_to_failure.is_some());
}

#[test]
fn scenario_cpu_plateau() {
    let history = vec![node(90.0, 30.0, 1.0, 50.0); 12];
    let p = HealthPredictor::default().predict(&history);

    assert_eq!(p.status, Status::Critical);
    assert_eq!(p.time_to_failure, None);
    assert!(p
        .issues
        .iter()
        .any(|i| i.severity == Severity::High && i.description.starts_with("CPU critically high")));
}

#[test]
fn scenario_cpu_and_memory_saturated() {
    let predictor = HealthPredictor::default();
    let cpu = predictor.predict(&vec![node(90.0, 30.0, 1.0, 0.0); 12]);
    let both = predictor.predict(&vec![node(90.0, 95.0, 1.0, 0.0); 12]);

    assert!(both.failure_probability > cpu.failure_probability);
    assert_eq!(both.status, Status::Critical);
    assert_eq!(
        both.issues.iter().filter(|i| i.severity == Severity::High).count(),
        2
    );
    assert!(both.confidence <= 95);
}

#[test]
fn scenario_latency_spike() {
    // Latency climbing 2.4ms/h from 16ms: all three latency rungs fire.
    let history: Vec<Sample> = (0..12)
        .map(|i| node(20.0, 20.0, 16.0 + 0.2 * i as f64, 20.0))
        .collect();
    let p = HealthPredictor::default().predict(&history);

    assert_eq!(p.issues.len(), 3);
    // 6 baseline + 5 + 15 + 20 + 10 compound
    assert_eq!(p.failure_probability, 56);
    assert_eq!(p.status, Status::Critical);
    // latency rules never project
    assert_eq!(p.time_to_failure, None);
}

#[test]
fn scenario_history_buffer_feeds_engine() {
    let config = AppConfig::default();
    let predictor = noderisk::predictor(&config);
    let mut history = History::with_capacity(config.server.history_capacity);

    for i in 0..300 {
        let cpu = if i < 288 { 20.0 } else { 90.0 };
        history.push(node(cpu, 20.0, 1.0, 10.0));
    }
    assert_eq!(history.len(), 288);

    // Only the last 12 samples matter; 12 of them are hot.
    let p = predictor.predict(history.samples());
    assert_eq!(p.status, Status::Critical);
}

#[test]
fn scenario_confidence_and_probability_bounds() {
    let predictor = HealthPredictor::new(EngineConfig::default(), RuleSet::standard());
    for cpu in [0.0, 50.0, 75.0, 95.0, 150.0] {
        for mem in [0.0, 65.0, 99.0] {
            for latency in [0.0, 12.0, 40.0] {
                for util in [-10.0, 0.0, 60.0, 65.4, 200.0] {
                    let p = predictor.predict(&vec![node(cpu, mem, latency, util); 12]);
                    assert!(p.failure_probability <= 100);
                    assert!(p.confidence <= 95);
                    if p.status == Status::Healthy {
                        assert!(p.confidence <= 70);
                    }
                    // The raw score is within half a point of the reported one.
                    let reported = p.failure_probability as f64;
                    assert!(
                        p.status == Status::from_probability(reported - 0.5)
                            || p.status == Status::from_probability(reported + 0.49)
                    );
                }
            }
        }
    }
}

#[test]
fn scenario_status_classified_before_rounding() {
    let predictor = HealthPredictor::default();

    // Baseline 19.62 is reported as 20 but the node is still healthy.
    let p = predictor.predict(&vec![node(20.0, 20.0, 1.0, 65.4); 12]);
    assert_eq!(p.failure_probability, 20);
    assert_eq!(p.status, Status::Healthy);
    assert!(p.confidence <= 70);

    // Baseline 20.01 is reported as 20 too, but crosses into warning.
    let p = predictor.predict(&vec![node(20.0, 20.0, 1.0, 66.7); 12]);
    assert_eq!(p.failure_probability, 20);
    assert_eq!(p.status, Status::Warning);
}
