//! Summary statistics over sample sets.

use serde::{Deserialize, Serialize};

/// Count, total, mean and sample standard deviation of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub samples: usize,
    pub total: f64,
    /// `None` when there are no samples.
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` with fewer than two samples.
    pub stddev: Option<f64>,
}

impl Stats {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Self {
        let samples = values.len();
        let total: f64 = values.iter().sum();
        if samples == 0 {
            return Self::default();
        }

        let mean = total / samples as f64;
        let stddev = (samples > 1).then(|| {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (samples - 1) as f64).sqrt()
        });

        Self {
            samples,
            total,
            mean: Some(mean),
            stddev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_mean() {
        let stats = Stats::from_values(&[]);
        assert_eq!(stats.samples, 0);
        assert!(stats.mean.is_none());
        assert!(stats.stddev.is_none());
    }

    #[test]
    fn single_value_has_no_stddev() {
        let stats = Stats::from_values(&[120.0]);
        assert_eq!(stats.mean, Some(120.0));
        assert!(stats.stddev.is_none());
    }

    #[test]
    fn sample_stddev() {
        let stats = Stats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.samples, 8);
        assert!((stats.total - 40.0).abs() < f64::EPSILON);
        assert_eq!(stats.mean, Some(5.0));
        // sum of squared deviations is 32, divided by n - 1
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((stats.stddev.unwrap() - expected).abs() < 1e-12);
    }
}
