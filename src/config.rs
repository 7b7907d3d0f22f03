use std::env;

use tracing::warn;

use crate::blend::{BlendWeights, BlendWindow};
use crate::context::LeagueBaselines;
use crate::error::PropError;
use crate::estimator::DEFAULT_MIN_EMPIRICAL_SAMPLES;
use crate::injury::DEFAULT_INJURY_USAGE_WEIGHT;

const DEFAULT_RECENT_GAMES: usize = 5;
const DEFAULT_SAMPLE_WINDOW_MULTIPLIER: usize = 4;
const DEFAULT_H2H_GAMES: usize = 5;
const DEFAULT_H2H_LOOKBACK_GAMES: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub league: LeagueBaselines,
    /// Multiplier weight per point of injured usage.
    pub injury_usage_weight: f64,
    pub recent_games: usize,
    /// The estimator's raw sample spans `recent_games * sample_window_multiplier` games.
    pub sample_window_multiplier: usize,
    pub h2h_games: usize,
    /// How far back the game log is pulled when hunting for head-to-head games.
    pub h2h_lookback_games: usize,
    pub min_empirical_samples: usize,
    pub weights: BlendWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            league: LeagueBaselines::default(),
            injury_usage_weight: DEFAULT_INJURY_USAGE_WEIGHT,
            recent_games: DEFAULT_RECENT_GAMES,
            sample_window_multiplier: DEFAULT_SAMPLE_WINDOW_MULTIPLIER,
            h2h_games: DEFAULT_H2H_GAMES,
            h2h_lookback_games: DEFAULT_H2H_LOOKBACK_GAMES,
            min_empirical_samples: DEFAULT_MIN_EMPIRICAL_SAMPLES,
            weights: BlendWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let float = |key: &str, default: f64, lo: f64, hi: f64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
                .clamp(lo, hi)
        };
        let count = |key: &str, default: usize, lo: usize, hi: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(default)
                .clamp(lo, hi)
        };

        let weights = match lookup("PROP_BLEND_WEIGHTS") {
            Some(raw) => parse_weights(&raw).unwrap_or_else(|err| {
                warn!(%err, raw = %raw, "ignoring PROP_BLEND_WEIGHTS");
                d.weights
            }),
            None => d.weights,
        };

        Self {
            league: LeagueBaselines {
                off_rating: float("PROP_LEAGUE_OFF_RATING", d.league.off_rating, 80.0, 140.0),
                def_rating: float("PROP_LEAGUE_DEF_RATING", d.league.def_rating, 80.0, 140.0),
                pace: float("PROP_LEAGUE_PACE", d.league.pace, 80.0, 120.0),
            },
            injury_usage_weight: float("PROP_INJURY_USAGE_WEIGHT", d.injury_usage_weight, 0.0, 0.1),
            recent_games: count("PROP_RECENT_GAMES", d.recent_games, 1, 82),
            sample_window_multiplier: count(
                "PROP_SAMPLE_WINDOW_MULTIPLIER",
                d.sample_window_multiplier,
                1,
                16,
            ),
            h2h_games: count("PROP_H2H_GAMES", d.h2h_games, 1, 20),
            h2h_lookback_games: count("PROP_H2H_LOOKBACK_GAMES", d.h2h_lookback_games, 1, 200),
            min_empirical_samples: count(
                "PROP_MIN_EMPIRICAL_SAMPLES",
                d.min_empirical_samples,
                1,
                200,
            ),
            weights,
        }
    }

    pub fn sample_games(&self) -> usize {
        self.recent_games.saturating_mul(self.sample_window_multiplier)
    }

    /// Game-log depth the collaborators should provide.
    pub fn games_to_fetch(&self) -> usize {
        self.h2h_lookback_games.max(self.sample_games())
    }

    pub fn blend_window(&self) -> BlendWindow {
        BlendWindow {
            recent_games: self.recent_games,
            sample_games: self.sample_games(),
            h2h_games: self.h2h_games,
        }
    }
}

/// Parses `baseline,recent,h2h,injury` into validated weights.
pub fn parse_weights(raw: &str) -> Result<BlendWeights, PropError> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| PropError::InvalidBlendWeights(f64::NAN))?;
    match parts.as_slice() {
        [b, r, h, i] => BlendWeights::new(*b, *r, *h, *i),
        _ => Err(PropError::InvalidBlendWeights(parts.iter().sum())),
    }
}
