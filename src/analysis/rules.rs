//! Declarative risk rules.
//!
//! Each [`Rule`] watches one [`Signal`] at one [`Severity`]. A rule holds an
//! ordered list of [`Arm`]s and fires on the first arm whose [`Trigger`]
//! matches; rules themselves are independent, so several rules for the same
//! signal can fire on the same reading.

use crate::analysis::format::{format_level, format_rate};
use crate::analysis::{Issue, Severity, TrendDirection};
use crate::metrics::Sample;
use serde::{Deserialize, Serialize};

/// A watched metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// CPU utilization, percent.
    Cpu,
    /// Memory used, percent of total.
    Memory,
    /// Network latency, milliseconds.
    Network,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Cpu, Signal::Memory, Signal::Network];

    pub fn read(&self, sample: &Sample) -> f64 {
        match self {
            Signal::Cpu => sample.cpu_usage,
            Signal::Memory => sample.memory_used_pct(),
            Signal::Network => sample.network_latency_ms,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Signal::Cpu | Signal::Memory => "%",
            Signal::Network => "ms",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Signal::Cpu => 0,
            Signal::Memory => 1,
            Signal::Network => 2,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Cpu => write!(f, "cpu"),
            Signal::Memory => write!(f, "memory"),
            Signal::Network => write!(f, "network"),
        }
    }
}

/// Latest value and hourly trend of one signal over the analysis window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub current: f64,
    pub trend: f64,
}

/// Condition under which an arm fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// `trend > min_trend` and `current > min_current`.
    Trending { min_trend: f64, min_current: f64 },
    /// `current > min_current`, regardless of trend.
    Elevated { min_current: f64 },
}

impl Trigger {
    pub fn matches(&self, reading: &Reading) -> bool {
        match *self {
            Trigger::Trending {
                min_trend,
                min_current,
            } => reading.trend > min_trend && reading.current > min_current,
            Trigger::Elevated { min_current } => reading.current > min_current,
        }
    }

    pub fn is_trending(&self) -> bool {
        matches!(self, Trigger::Trending { .. })
    }
}

/// One branch of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub trigger: Trigger,
    /// Failure-probability points contributed when this arm fires.
    pub points: f64,
    /// Threshold to project a crossing time towards, whatever the trigger
    /// kind. Projections only happen while the signal is rising.
    #[serde(default)]
    pub projection: Option<f64>,
    pub label: String,
}

impl Arm {
    fn trending(min_trend: f64, min_current: f64, points: f64, projection: Option<f64>, label: &str) -> Self {
        Self {
            trigger: Trigger::Trending {
                min_trend,
                min_current,
            },
            points,
            projection,
            label: label.to_string(),
        }
    }

    fn elevated(min_current: f64, points: f64, projection: Option<f64>, label: &str) -> Self {
        Self {
            trigger: Trigger::Elevated { min_current },
            points,
            projection,
            label: label.to_string(),
        }
    }

    /// Hours until `current` reaches the projection threshold at the current
    /// trend. `None` unless the crossing lies strictly in the future.
    pub fn projected_hours(&self, reading: &Reading) -> Option<f64> {
        if reading.trend <= 0.0 {
            return None;
        }
        let threshold = self.projection?;
        let hours = (threshold - reading.current) / reading.trend;
        (hours.is_finite() && hours > 0.0).then_some(hours)
    }
}

/// A triggered rule, ready to be folded into the risk score.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub issue: Issue,
    pub points: f64,
    pub projected_hours: Option<f64>,
}

/// One rung of a signal's ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub signal: Signal,
    pub severity: Severity,
    pub arms: Vec<Arm>,
}

impl Rule {
    /// Evaluate against a reading of this rule's signal. The first matching
    /// arm wins.
    pub fn evaluate(&self, reading: &Reading) -> Option<Outcome> {
        let arm = self.arms.iter().find(|a| a.trigger.matches(reading))?;
        let unit = self.signal.unit();

        let (trend, trend_rate) = if arm.trigger.is_trending() {
            (TrendDirection::Degrading, format_rate(reading.trend, unit))
        } else {
            (
                TrendDirection::from_rate(reading.trend),
                format_level(reading.current, unit),
            )
        };

        Some(Outcome {
            issue: Issue {
                metric: self.signal,
                severity: self.severity,
                description: format!("{} ({})", arm.label, trend_rate),
                trend,
                trend_rate,
            },
            points: arm.points,
            projected_hours: arm.projected_hours(reading),
        })
    }
}

/// Ordered collection of rules. Evaluation order is issue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The stock ladder for CPU, memory and network latency.
    pub fn standard() -> Self {
        let rules = vec![
            // CPU
            Rule {
                signal: Signal::Cpu,
                severity: Severity::Low,
                arms: vec![Arm::trending(2.0, 50.0, 10.0, Some(80.0), "CPU usage trending upward")],
            },
            Rule {
                signal: Signal::Cpu,
                severity: Severity::Medium,
                arms: vec![
                    Arm::trending(3.0, 60.0, 20.0, Some(90.0), "CPU usage rising rapidly"),
                    Arm::elevated(70.0, 20.0, Some(90.0), "CPU usage elevated"),
                ],
            },
            Rule {
                signal: Signal::Cpu,
                severity: Severity::High,
                arms: vec![
                    Arm::trending(5.0, 70.0, 30.0, Some(100.0), "CPU approaching saturation"),
                    Arm::elevated(85.0, 35.0, None, "CPU critically high"),
                ],
            },
            // Memory
            Rule {
                signal: Signal::Memory,
                severity: Severity::Low,
                arms: vec![Arm::trending(1.5, 50.0, 10.0, Some(80.0), "Memory usage trending upward")],
            },
            Rule {
                signal: Signal::Memory,
                severity: Severity::Medium,
                arms: vec![
                    Arm::trending(2.0, 60.0, 20.0, Some(90.0), "Memory usage rising rapidly"),
                    Arm::elevated(70.0, 20.0, Some(90.0), "Memory usage elevated"),
                ],
            },
            Rule {
                signal: Signal::Memory,
                severity: Severity::High,
                arms: vec![
                    Arm::trending(5.0, 60.0, 35.0, Some(100.0), "Memory growing fast, possible leak"),
                    Arm::trending(4.0, 60.0, 30.0, Some(100.0), "Memory approaching exhaustion"),
                    Arm::elevated(90.0, 40.0, None, "Memory critically high"),
                ],
            },
            // Network latency
            Rule {
                signal: Signal::Network,
                severity: Severity::Low,
                arms: vec![Arm::trending(0.5, 5.0, 5.0, None, "Network latency increasing")],
            },
            Rule {
                signal: Signal::Network,
                severity: Severity::Medium,
                arms: vec![
                    Arm::trending(1.0, 10.0, 15.0, None, "Network latency rising rapidly"),
                    Arm::elevated(15.0, 15.0, None, "Network latency elevated"),
                ],
            },
            Rule {
                signal: Signal::Network,
                severity: Severity::High,
                arms: vec![
                    Arm::trending(2.0, 15.0, 20.0, None, "Network latency degrading severely"),
                    Arm::elevated(25.0, 25.0, None, "Network latency critically high"),
                ],
            },
        ];
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(signal: Signal, severity: Severity) -> Rule {
        RuleSet::standard()
            .rules()
            .iter()
            .find(|r| r.signal == signal && r.severity == severity)
            .cloned()
            .expect("rule missing from standard set")
    }

    fn reading(current: f64, trend: f64) -> Reading {
        Reading { current, trend }
    }

    #[test]
    fn test_standard_order() {
        let set = RuleSet::standard();
        let order: Vec<(Signal, Severity)> =
            set.rules().iter().map(|r| (r.signal, r.severity)).collect();
        assert_eq!(
            order,
            vec![
                (Signal::Cpu, Severity::Low),
                (Signal::Cpu, Severity::Medium),
                (Signal::Cpu, Severity::High),
                (Signal::Memory, Severity::Low),
                (Signal::Memory, Severity::Medium),
                (Signal::Memory, Severity::High),
                (Signal::Network, Severity::Low),
                (Signal::Network, Severity::Medium),
                (Signal::Network, Severity::High),
            ]
        );
    }

    #[test]
    fn test_cpu_early_warning_projects_to_80() {
        let out = rule(Signal::Cpu, Severity::Low)
            .evaluate(&reading(71.0, 12.0))
            .expect("should fire");
        assert_eq!(out.points, 10.0);
        assert_eq!(out.issue.metric, Signal::Cpu);
        assert_eq!(out.issue.trend, TrendDirection::Degrading);
        assert_eq!(out.issue.trend_rate, "+12.0%/h");
        let hours = out.projected_hours.expect("projection");
        assert!((hours - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_early_warning_needs_both_conditions() {
        let r = rule(Signal::Cpu, Severity::Low);
        assert!(r.evaluate(&reading(45.0, 10.0)).is_none());
        assert!(r.evaluate(&reading(75.0, 2.0)).is_none());
    }

    #[test]
    fn test_cpu_medium_elevated_flat_has_no_projection() {
        let out = rule(Signal::Cpu, Severity::Medium)
            .evaluate(&reading(75.0, 0.0))
            .expect("should fire");
        assert_eq!(out.points, 20.0);
        assert_eq!(out.projected_hours, None);
        assert_eq!(out.issue.trend, TrendDirection::Stable);
        assert_eq!(out.issue.trend_rate, "75.0%");
        assert_eq!(out.issue.description, "CPU usage elevated (75.0%)");
    }

    #[test]
    fn test_cpu_medium_elevated_rising_projects_to_90() {
        let out = rule(Signal::Cpu, Severity::Medium)
            .evaluate(&reading(85.0, 2.4))
            .expect("should fire");
        assert_eq!(out.points, 20.0);
        assert_eq!(out.issue.trend, TrendDirection::Degrading);
        assert_eq!(out.issue.trend_rate, "85.0%");
        let hours = out.projected_hours.expect("projection");
        assert!((hours - 5.0 / 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_memory_medium_elevated_rising_projects_to_90() {
        let out = rule(Signal::Memory, Severity::Medium)
            .evaluate(&reading(80.0, 1.0))
            .expect("should fire");
        assert_eq!(out.projected_hours, Some(10.0));
    }

    #[test]
    fn test_high_elevated_arms_never_project() {
        let cpu = rule(Signal::Cpu, Severity::High)
            .evaluate(&reading(88.0, 4.0))
            .expect("should fire");
        assert_eq!(cpu.points, 35.0);
        assert_eq!(cpu.projected_hours, None);

        let mem = rule(Signal::Memory, Severity::High)
            .evaluate(&reading(92.0, 3.0))
            .expect("should fire");
        assert_eq!(mem.points, 40.0);
        assert_eq!(mem.projected_hours, None);
    }

    #[test]
    fn test_cpu_high_stable_branch() {
        let out = rule(Signal::Cpu, Severity::High)
            .evaluate(&reading(90.0, 0.0))
            .expect("should fire");
        assert_eq!(out.points, 35.0);
        assert_eq!(out.projected_hours, None);
    }

    #[test]
    fn test_cpu_high_trending_takes_precedence() {
        let out = rule(Signal::Cpu, Severity::High)
            .evaluate(&reading(90.0, 6.0))
            .expect("should fire");
        assert_eq!(out.points, 30.0);
        let hours = out.projected_hours.expect("projection");
        assert!((hours - 10.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_leak_arm() {
        let r = rule(Signal::Memory, Severity::High);
        let leak = r.evaluate(&reading(65.0, 6.0)).expect("should fire");
        assert_eq!(leak.points, 35.0);
        assert!(leak.issue.description.contains("possible leak"));

        let growth = r.evaluate(&reading(65.0, 4.5)).expect("should fire");
        assert_eq!(growth.points, 30.0);

        let full = r.evaluate(&reading(95.0, 0.0)).expect("should fire");
        assert_eq!(full.points, 40.0);
        assert_eq!(full.projected_hours, None);
    }

    #[test]
    fn test_latency_rules_never_project() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            let out = rule(Signal::Network, severity)
                .evaluate(&reading(30.0, 5.0))
                .expect("should fire");
            assert_eq!(out.projected_hours, None);
            assert!(out.issue.trend_rate.ends_with("ms/h"));
        }
    }

    #[test]
    fn test_latency_points() {
        let r = reading(30.0, 0.0);
        assert!(rule(Signal::Network, Severity::Low).evaluate(&r).is_none());
        assert_eq!(
            rule(Signal::Network, Severity::Medium).evaluate(&r).map(|o| o.points),
            Some(15.0)
        );
        assert_eq!(
            rule(Signal::Network, Severity::High).evaluate(&r).map(|o| o.points),
            Some(25.0)
        );
    }

    #[test]
    fn test_projection_ignores_crossed_threshold() {
        // Memory at 85% rising: the 80% target is already behind us.
        let out = rule(Signal::Memory, Severity::Low)
            .evaluate(&reading(85.0, 2.0))
            .expect("should fire");
        assert_eq!(out.projected_hours, None);
    }

    #[test]
    fn test_falling_elevated_reading_is_improving() {
        let out = rule(Signal::Cpu, Severity::High)
            .evaluate(&reading(92.0, -3.0))
            .expect("should fire");
        assert_eq!(out.issue.trend, TrendDirection::Improving);
    }

    #[test]
    fn test_signal_reads_sample() {
        let s = Sample {
            cpu_usage: 55.0,
            memory_used: 2.0,
            memory_total: 8.0,
            network_latency_ms: 3.5,
            ..Sample::default()
        };
        assert_eq!(Signal::Cpu.read(&s), 55.0);
        assert_eq!(Signal::Memory.read(&s), 25.0);
        assert_eq!(Signal::Network.read(&s), 3.5);
    }
}
