use serde::{Deserialize, Serialize};

use crate::model::Direction;
use crate::stats::{empirical_probability, normal_cdf};

pub const DEFAULT_MIN_EMPIRICAL_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateMethod {
    /// Observed hit rate over the raw game sample.
    Empirical,
    /// Normal approximation around the blended mean.
    Gaussian,
    /// Zero spread: the blended mean either clears the line or it doesn't.
    Degenerate,
}

impl EstimateMethod {
    pub fn label(self) -> &'static str {
        match self {
            EstimateMethod::Empirical => "empirical",
            EstimateMethod::Gaussian => "gaussian",
            EstimateMethod::Degenerate => "degenerate",
        }
    }
}

/// Probability before any contextual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub probability: f64,
    pub method: EstimateMethod,
}

#[derive(Debug, Clone, Copy)]
pub struct ProbabilityEstimator {
    min_empirical_samples: usize,
}

impl Default for ProbabilityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_EMPIRICAL_SAMPLES)
    }
}

impl ProbabilityEstimator {
    pub fn new(min_empirical_samples: usize) -> Self {
        Self {
            min_empirical_samples,
        }
    }

    pub fn min_empirical_samples(&self) -> usize {
        self.min_empirical_samples
    }

    /// With enough history the empirical hit rate wins and `mean`/`std` are ignored.
    pub fn estimate(
        &self,
        sample: &[f64],
        mean: f64,
        std: f64,
        line: f64,
        direction: Direction,
    ) -> Estimate {
        if sample.len() >= self.min_empirical_samples
            && let Some(probability) = empirical_probability(sample, line, direction)
        {
            return Estimate {
                probability,
                method: EstimateMethod::Empirical,
            };
        }
        gauss_probability(mean, std, line, direction)
    }
}

pub fn gauss_probability(mean: f64, std: f64, line: f64, direction: Direction) -> Estimate {
    if std <= 0.0 || !std.is_finite() {
        let probability = if direction.is_satisfied_by(mean, line) {
            1.0
        } else {
            0.0
        };
        return Estimate {
            probability,
            method: EstimateMethod::Degenerate,
        };
    }

    let z = (line - mean) / std;
    let probability = match direction {
        Direction::Over => 1.0 - normal_cdf(z),
        Direction::Under => normal_cdf(z),
    };
    Estimate {
        probability,
        method: EstimateMethod::Gaussian,
    }
}
