//! Linear trend estimation over fixed-cadence series.

/// Default cadence: one sample every 5 minutes.
pub const DEFAULT_SAMPLES_PER_HOUR: f64 = 12.0;

/// Least-squares trend of a fixed-cadence series, reported per hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendEstimator {
    samples_per_hour: f64,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_HOUR)
    }
}

impl TrendEstimator {
    pub fn new(samples_per_hour: f64) -> Self {
        Self { samples_per_hour }
    }

    pub fn samples_per_hour(&self) -> f64 {
        self.samples_per_hour
    }

    /// Slope of `values` against their index, per sample.
    /// Fewer than two values carry no trend and yield `0.0`.
    pub fn slope_per_sample(values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return 0.0;
        }

        let n_f = n as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        // Never zero for n >= 2 with distinct integer x.
        let denom = n_f * sum_x2 - sum_x * sum_x;
        (n_f * sum_xy - sum_x * sum_y) / denom
    }

    /// Signed rate of change per hour.
    pub fn rate_per_hour(&self, values: &[f64]) -> f64 {
        Self::slope_per_sample(values) * self.samples_per_hour
    }
}
