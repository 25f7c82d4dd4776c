//! Predictive health scoring: trend estimation, rule evaluation and the
//! final prediction record.

pub mod format;
pub mod predictor;
pub mod risk;
pub mod rules;
pub mod trend;

pub use self::predictor::HealthPredictor;
pub use self::rules::{RuleSet, Signal};
pub use self::trend::TrendEstimator;

use serde::{Deserialize, Serialize};

/// Probability below which a node is healthy.
pub const WARNING_THRESHOLD: f64 = 20.0;
/// Probability at or above which a node is critical.
pub const CRITICAL_THRESHOLD: f64 = 50.0;

/// Overall node status derived from the failure probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Warning,
    Critical,
}

impl Status {
    /// Half-open bands: `[0, 20)` healthy, `[20, 50)` warning, `[50, ..)` critical.
    pub fn from_probability(probability: f64) -> Self {
        if probability < WARNING_THRESHOLD {
            Status::Healthy
        } else if probability < CRITICAL_THRESHOLD {
            Status::Warning
        } else {
            Status::Critical
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Healthy => write!(f, "healthy"),
            Status::Warning => write!(f, "warning"),
            Status::Critical => write!(f, "critical"),
        }
    }
}

/// Severity of a single detected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Direction a metric is moving in, from the node's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Stable,
    Improving,
    Degrading,
}

impl TrendDirection {
    /// All watched signals get worse as they grow.
    pub fn from_rate(rate_per_hour: f64) -> Self {
        if rate_per_hour > 0.0 {
            TrendDirection::Degrading
        } else if rate_per_hour < 0.0 {
            TrendDirection::Improving
        } else {
            TrendDirection::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Stable => write!(f, "stable"),
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Degrading => write!(f, "degrading"),
        }
    }
}

/// A single triggered risk rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub metric: Signal,
    pub severity: Severity,
    pub description: String,
    pub trend: TrendDirection,
    pub trend_rate: String,
}

/// Result of one evaluation of a node's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub status: Status,
    /// Integer percentage in `[0, 100]`, rounded from the raw score.
    /// `status` is classified on the raw score before rounding, so 19.6
    /// reports as 20 and stays healthy.
    pub failure_probability: u8,
    /// Present only when a projected crossing falls inside the horizon.
    pub time_to_failure: Option<String>,
    /// Integer percentage in `[0, 95]`.
    pub confidence: u8,
    pub issues: Vec<Issue>,
    pub recommendation: String,
}

impl Prediction {
    /// Result for a history too short to evaluate.
    pub fn collecting(required: usize) -> Self {
        Self {
            status: Status::Healthy,
            failure_probability: 0,
            time_to_failure: None,
            confidence: 0,
            issues: Vec::new(),
            recommendation: format!(
                "Collecting metrics... need at least {} samples for prediction.",
                required
            ),
        }
    }
}
