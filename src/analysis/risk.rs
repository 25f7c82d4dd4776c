//! Risk accumulation as a pure fold over rule outcomes.

use crate::analysis::rules::Outcome;
use crate::analysis::{Issue, Severity};

/// Cap on the load-proportional baseline contribution.
pub const BASELINE_CAP: f64 = 30.0;

/// Bonus when two or more high-severity issues coexist.
pub const COMPOUND_MULTI_HIGH: f64 = 20.0;
/// Bonus for at least one high plus at least one medium issue.
pub const COMPOUND_HIGH_MEDIUM: f64 = 10.0;
/// Bonus for two or more medium issues.
pub const COMPOUND_MULTI_MEDIUM: f64 = 5.0;

/// Running state of one evaluation. Every step consumes the accumulator and
/// returns a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskAccumulator {
    points: f64,
    issues: Vec<Issue>,
    earliest_hours: Option<f64>,
}

impl RiskAccumulator {
    /// Start from the load-proportional baseline: `min(30, score * 30 / 100)`.
    pub fn from_utilization(utilization_score: f64) -> Self {
        let baseline = (utilization_score * BASELINE_CAP / 100.0).min(BASELINE_CAP);
        Self::default().add_points(baseline)
    }

    pub fn add_points(mut self, points: f64) -> Self {
        self.points += points;
        self
    }

    /// Keep the earliest projected crossing seen so far.
    pub fn project(mut self, hours: f64) -> Self {
        self.earliest_hours = Some(match self.earliest_hours {
            Some(current) => current.min(hours),
            None => hours,
        });
        self
    }

    /// Fold one triggered rule into the score.
    pub fn absorb(self, outcome: Outcome) -> Self {
        let Outcome {
            issue,
            points,
            projected_hours,
        } = outcome;

        let mut acc = self.add_points(points);
        if let Some(hours) = projected_hours {
            acc = acc.project(hours);
        }
        acc.issues.push(issue);
        acc
    }

    /// Extra points for simultaneous degradation across signals.
    pub fn amplify(self) -> Self {
        let bonus = compound_bonus(&self.issues);
        self.add_points(bonus)
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn earliest_hours(&self) -> Option<f64> {
        self.earliest_hours
    }

    pub fn into_parts(self) -> (f64, Vec<Issue>, Option<f64>) {
        (self.points, self.issues, self.earliest_hours)
    }
}

/// Compound-risk premium from the severity mix of `issues`.
pub fn compound_bonus(issues: &[Issue]) -> f64 {
    let high = issues.iter().filter(|i| i.severity == Severity::High).count();
    let medium = issues.iter().filter(|i| i.severity == Severity::Medium).count();

    if high >= 2 {
        COMPOUND_MULTI_HIGH
    } else if high >= 1 && medium >= 1 {
        COMPOUND_HIGH_MEDIUM
    } else if medium >= 2 {
        COMPOUND_MULTI_MEDIUM
    } else {
        0.0
    }
}
