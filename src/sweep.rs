use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::context::ContextChain;
use crate::estimator::{EstimateMethod, ProbabilityEstimator};
use crate::model::{Direction, LineRange};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub line: f64,
    pub probability: f64,
    pub raw_probability: f64,
    pub method: EstimateMethod,
}

/// Scores every integer line in `range` with the same sample, blend and factors.
pub fn sweep_lines(
    estimator: &ProbabilityEstimator,
    chain: &ContextChain,
    sample: &[f64],
    mean: f64,
    std: f64,
    range: LineRange,
    direction: Direction,
) -> Vec<SweepEntry> {
    let mut entries: Vec<SweepEntry> = range
        .lines()
        .map(|line| {
            let est = estimator.estimate(sample, mean, std, line, direction);
            SweepEntry {
                line,
                probability: chain.apply(est.probability),
                raw_probability: est.probability,
                method: est.method,
            }
        })
        .collect();
    rank_entries(&mut entries, direction);
    entries
}

/// Most favourable first: highest probability, then the easier line for the direction.
pub fn rank_entries(entries: &mut [SweepEntry], direction: Direction) {
    entries.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match direction {
                Direction::Over => a.line.total_cmp(&b.line),
                Direction::Under => b.line.total_cmp(&a.line),
            })
    });
}
