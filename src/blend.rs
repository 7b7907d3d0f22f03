use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PropError;
use crate::model::{GameStatLine, StatSelection};
use crate::stats::{mean, sample_std_dev};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Convex weights for the blended mean. Construction guarantees they sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendWeights {
    baseline: f64,
    recent: f64,
    head_to_head: f64,
    injury_adjusted: f64,
}

pub const DEFAULT_BLEND_WEIGHTS: BlendWeights = BlendWeights {
    baseline: 0.35,
    recent: 0.30,
    head_to_head: 0.20,
    injury_adjusted: 0.15,
};

impl Default for BlendWeights {
    fn default() -> Self {
        DEFAULT_BLEND_WEIGHTS
    }
}

impl BlendWeights {
    pub fn new(
        baseline: f64,
        recent: f64,
        head_to_head: f64,
        injury_adjusted: f64,
    ) -> Result<Self, PropError> {
        let w = Self {
            baseline,
            recent,
            head_to_head,
            injury_adjusted,
        };
        let all = [baseline, recent, head_to_head, injury_adjusted];
        let sum = w.sum();
        if all.iter().any(|v| !v.is_finite() || *v < 0.0)
            || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE
        {
            return Err(PropError::InvalidBlendWeights(sum));
        }
        Ok(w)
    }

    pub fn sum(&self) -> f64 {
        self.baseline + self.recent + self.head_to_head + self.injury_adjusted
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn recent(&self) -> f64 {
        self.recent
    }

    pub fn head_to_head(&self) -> f64 {
        self.head_to_head
    }

    pub fn injury_adjusted(&self) -> f64 {
        self.injury_adjusted
    }
}

/// How many games feed each signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendWindow {
    /// Recent-form mean/std window.
    pub recent_games: usize,
    /// Raw sample handed to the estimator (a wider window than `recent_games`).
    pub sample_games: usize,
    /// Cap on head-to-head games, most recent first.
    pub h2h_games: usize,
}

/// Everything that went into the blended mean, kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendSummary {
    pub baseline: f64,
    pub recent_mean: f64,
    pub recent_std: f64,
    pub recent_games: usize,
    pub h2h_mean: f64,
    pub h2h_games: usize,
    pub injury_multiplier: f64,
    pub injury_adjusted_baseline: f64,
    pub blended_mean: f64,
    pub blended_std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlendedSignal {
    pub summary: BlendSummary,
    /// Per-game totals for the estimator's empirical path, most recent first.
    pub sample: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalBlender {
    weights: BlendWeights,
    window: BlendWindow,
}

impl SignalBlender {
    pub fn new(weights: BlendWeights, window: BlendWindow) -> Self {
        Self { weights, window }
    }

    /// `games` must be most-recent-first.
    pub fn blend(
        &self,
        selection: StatSelection,
        baseline: f64,
        games: &[GameStatLine],
        opponent: &str,
        injury_multiplier: f64,
    ) -> BlendedSignal {
        let recent = totals(selection, games.iter().take(self.window.recent_games));
        let sample = totals(selection, games.iter().take(self.window.sample_games));
        let h2h = head_to_head_totals(selection, games, opponent, self.window.h2h_games);

        let (recent_mean, recent_std) = if recent.is_empty() {
            (baseline, 0.0)
        } else {
            (mean(&recent), sample_std_dev(&recent))
        };
        let h2h_mean = if h2h.is_empty() { baseline } else { mean(&h2h) };
        let injury_adjusted_baseline = baseline * injury_multiplier;

        let w = &self.weights;
        let blended_mean = w.baseline * baseline
            + w.recent * recent_mean
            + w.head_to_head * h2h_mean
            + w.injury_adjusted * injury_adjusted_baseline;

        debug!(
            selection = %selection,
            baseline,
            recent_mean,
            recent_std,
            h2h_mean,
            h2h_games = h2h.len(),
            blended_mean,
            "blended signals"
        );

        BlendedSignal {
            summary: BlendSummary {
                baseline,
                recent_mean,
                recent_std,
                recent_games: recent.len(),
                h2h_mean,
                h2h_games: h2h.len(),
                injury_multiplier,
                injury_adjusted_baseline,
                blended_mean,
                blended_std: recent_std,
            },
            sample,
        }
    }
}

fn totals<'a, I>(selection: StatSelection, games: I) -> Vec<f64>
where
    I: Iterator<Item = &'a GameStatLine>,
{
    games.map(|g| selection.game_total(g)).collect()
}

pub fn head_to_head_totals(
    selection: StatSelection,
    games: &[GameStatLine],
    opponent: &str,
    cap: usize,
) -> Vec<f64> {
    totals(
        selection,
        games.iter().filter(|g| g.played_against(opponent)).take(cap),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoxScore;

    fn game(matchup: &str, pts: f64, reb: f64, ast: f64) -> GameStatLine {
        GameStatLine::new(
            "2025-01-01",
            matchup,
            32.0,
            BoxScore {
                pts,
                reb,
                ast,
                ..Default::default()
            },
        )
    }

    fn window() -> BlendWindow {
        BlendWindow {
            recent_games: 5,
            sample_games: 20,
            h2h_games: 5,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!((0.35_f64 + 0.30 + 0.20 + 0.15 - 1.00).abs() < 1e-12);
        assert!((DEFAULT_BLEND_WEIGHTS.sum() - 1.0).abs() < 1e-12);
        assert!(BlendWeights::new(0.35, 0.30, 0.20, 0.15).is_ok());
    }

    #[test]
    fn weights_reject_bad_sums_and_negatives() {
        assert!(BlendWeights::new(0.4, 0.3, 0.2, 0.2).is_err());
        assert!(BlendWeights::new(1.2, -0.2, 0.0, 0.0).is_err());
        assert!(BlendWeights::new(f64::NAN, 0.3, 0.2, 0.15).is_err());
    }

    #[test]
    fn blended_mean_is_the_weighted_average() {
        let games = vec![
            game("GSW vs. LAL", 30.0, 0.0, 0.0),
            game("GSW @ BOS", 20.0, 0.0, 0.0),
            game("GSW @ LAL", 10.0, 0.0, 0.0),
        ];
        let blender = SignalBlender::new(DEFAULT_BLEND_WEIGHTS, window());
        let sel: StatSelection = "P".parse().unwrap();
        let out = blender.blend(sel, 24.0, &games, "LAL", 1.1);

        assert_eq!(out.summary.recent_games, 3);
        assert!((out.summary.recent_mean - 20.0).abs() < 1e-12);
        assert!((out.summary.recent_std - 10.0).abs() < 1e-12);
        assert_eq!(out.summary.h2h_games, 2);
        assert!((out.summary.h2h_mean - 20.0).abs() < 1e-12);

        let expected = 0.35 * 24.0 + 0.30 * 20.0 + 0.20 * 20.0 + 0.15 * (24.0 * 1.1);
        assert!((out.summary.blended_mean - expected).abs() < 1e-9);
        assert_eq!(out.summary.blended_std, out.summary.recent_std);
    }

    #[test]
    fn missing_history_falls_back_to_baseline() {
        let blender = SignalBlender::new(DEFAULT_BLEND_WEIGHTS, window());
        let out = blender.blend(StatSelection::PRA, 30.0, &[], "NYK", 1.0);
        assert_eq!(out.summary.recent_mean, 30.0);
        assert_eq!(out.summary.h2h_mean, 30.0);
        assert_eq!(out.summary.blended_std, 0.0);
        assert!((out.summary.blended_mean - 30.0).abs() < 1e-9);
        assert!(out.sample.is_empty());
    }

    #[test]
    fn windows_cap_recent_sample_and_h2h() {
        let games: Vec<_> = (0..30)
            .map(|i| game("GSW vs. LAL", i as f64, 1.0, 1.0))
            .collect();
        let blender = SignalBlender::new(DEFAULT_BLEND_WEIGHTS, window());
        let out = blender.blend(StatSelection::PRA, 10.0, &games, "LAL", 1.0);
        assert_eq!(out.summary.recent_games, 5);
        assert_eq!(out.sample.len(), 20);
        assert_eq!(out.summary.h2h_games, 5);
        // most recent first: totals 2, 3, 4, 5, 6
        assert!((out.summary.recent_mean - 4.0).abs() < 1e-12);
        assert_eq!(out.sample[0], 2.0);
    }

    #[test]
    fn combined_selection_sums_each_game() {
        let games = vec![game("GSW vs. LAL", 20.0, 8.0, 5.0)];
        let pr: StatSelection = "PR".parse().unwrap();
        assert_eq!(head_to_head_totals(pr, &games, "LAL", 5), vec![28.0]);
        assert!(head_to_head_totals(pr, &games, "MIA", 5).is_empty());
    }
}
