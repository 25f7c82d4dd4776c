//! The prediction engine: windowing, rule evaluation and classification.

use crate::analysis::format::format_duration;
use crate::analysis::risk::RiskAccumulator;
use crate::analysis::rules::{Reading, RuleSet, Signal};
use crate::analysis::trend::TrendEstimator;
use crate::analysis::{Prediction, Status};
use crate::config::EngineConfig;
use crate::metrics::Sample;
use tracing::debug;

/// Upper bound on reported confidence.
pub const MAX_CONFIDENCE: f64 = 95.0;
/// Confidence cap while the node is healthy.
pub const HEALTHY_CONFIDENCE_CAP: f64 = 70.0;

const CONFIDENCE_BASE: f64 = 40.0;
const CONFIDENCE_PER_ISSUE: f64 = 15.0;
const CRITICAL_CONFIDENCE_BOOST: f64 = 10.0;

/// Probability above which a healthy node still gets a "minor trends" note.
const MINOR_TREND_THRESHOLD: f64 = 10.0;

/// Scores a node's recent history into a [`Prediction`].
///
/// Stateless: every call reads only its input and the immutable rule set, so
/// a single predictor can be shared across threads and nodes.
#[derive(Debug, Clone)]
pub struct HealthPredictor {
    config: EngineConfig,
    rules: RuleSet,
    trend: TrendEstimator,
}

impl Default for HealthPredictor {
    fn default() -> Self {
        Self::new(EngineConfig::default(), RuleSet::standard())
    }
}

impl HealthPredictor {
    pub fn new(config: EngineConfig, rules: RuleSet) -> Self {
        Self {
            trend: TrendEstimator::new(config.samples_per_hour),
            config,
            rules,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate `history`, ordered oldest first.
    pub fn predict(&self, history: &[Sample]) -> Prediction {
        let window_size = self.config.window_size;
        if history.len() < window_size {
            debug!(have = history.len(), need = window_size, "not enough samples to predict");
            return Prediction::collecting(window_size);
        }

        let window = &history[history.len() - window_size..];
        let Some(latest) = window.last() else {
            return Prediction::collecting(window_size);
        };
        let readings = self.readings(window);

        let (raw, issues, earliest_hours) = self
            .rules
            .rules()
            .iter()
            .filter_map(|rule| rule.evaluate(&readings[rule.signal.index()]))
            .fold(
                RiskAccumulator::from_utilization(latest.utilization_score),
                RiskAccumulator::absorb,
            )
            .amplify()
            .into_parts();

        let probability = raw.clamp(0.0, 100.0);
        let status = Status::from_probability(probability);
        let confidence = confidence(issues.len(), status);

        let time_to_failure = earliest_hours
            .filter(|&h| h < self.config.horizon_hours)
            .map(format_duration);

        debug!(
            %status,
            probability,
            confidence,
            issues = issues.len(),
            ttf = ?time_to_failure,
            "prediction computed"
        );

        Prediction {
            status,
            failure_probability: probability.round() as u8,
            time_to_failure,
            confidence: confidence.round() as u8,
            recommendation: recommendation(status, probability).to_string(),
            issues,
        }
    }

    /// Current value and hourly trend of every signal over `window`.
    fn readings(&self, window: &[Sample]) -> [Reading; 3] {
        let mut readings = [Reading::default(); 3];
        for signal in Signal::ALL {
            let values: Vec<f64> = window.iter().map(|s| signal.read(s)).collect();
            readings[signal.index()] = Reading {
                current: values.last().copied().unwrap_or_default(),
                trend: self.trend.rate_per_hour(&values),
            };
        }
        readings
    }
}

/// More issues mean more evidence. Healthy verdicts are capped lower,
/// critical ones get a boost.
pub fn confidence(issue_count: usize, status: Status) -> f64 {
    let base = (issue_count as f64 * CONFIDENCE_PER_ISSUE + CONFIDENCE_BASE).min(MAX_CONFIDENCE);
    match status {
        Status::Healthy => base.min(HEALTHY_CONFIDENCE_CAP),
        Status::Warning => base,
        Status::Critical => (base + CRITICAL_CONFIDENCE_BOOST).min(MAX_CONFIDENCE),
    }
}

pub fn recommendation(status: Status, probability: f64) -> &'static str {
    match status {
        Status::Critical => {
            "Immediate attention required: node shows multiple failure indicators. \
             Consider scaling resources or redistributing load."
        }
        Status::Warning => {
            "Monitor closely: degrading trends detected. \
             Plan capacity adjustments within the next few hours."
        }
        Status::Healthy if probability > MINOR_TREND_THRESHOLD => {
            "Node is healthy with minor trends. Continue routine monitoring."
        }
        Status::Healthy => "Node is operating optimally. No action needed.",
    }
}
