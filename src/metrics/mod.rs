//! Per-node operational samples and the caller-side history buffer.

pub mod history;

pub use self::history::History;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One operational snapshot of a node.
///
/// Every numeric field defaults to zero when missing from the input, so a
/// partially populated JSON document still yields a usable sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,

    pub cpu_usage: f64,
    pub cpu_idle: f64,

    pub memory_used: f64,
    pub memory_total: f64,

    pub disk_read_rate: f64,
    pub disk_write_rate: f64,

    pub network_latency_ms: f64,
    pub network_throughput: f64,
    pub peer_count: u32,

    pub query_count: u64,
    pub query_latency_p50_ms: f64,
    pub query_latency_p95_ms: f64,
    pub query_latency_p99_ms: f64,

    pub replication_events: u64,
    pub replication_failures: u64,

    pub error_count: u64,
    pub error_rate: f64,

    /// Utilization/health score in `[0, 100]`.
    pub utilization_score: f64,
    pub uptime_secs: u64,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::default(),
            cpu_usage: 0.0,
            cpu_idle: 0.0,
            memory_used: 0.0,
            memory_total: 0.0,
            disk_read_rate: 0.0,
            disk_write_rate: 0.0,
            network_latency_ms: 0.0,
            network_throughput: 0.0,
            peer_count: 0,
            query_count: 0,
            query_latency_p50_ms: 0.0,
            query_latency_p95_ms: 0.0,
            query_latency_p99_ms: 0.0,
            replication_events: 0,
            replication_failures: 0,
            error_count: 0,
            error_rate: 0.0,
            utilization_score: 0.0,
            uptime_secs: 0,
        }
    }
}

impl Sample {
    /// Memory in use as a percentage of total. Zero when the total is unknown.
    pub fn memory_used_pct(&self) -> f64 {
        if self.memory_total > 0.0 {
            self.memory_used / self.memory_total * 100.0
        } else {
            0.0
        }
    }
}
