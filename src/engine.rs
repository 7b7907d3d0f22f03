use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::blend::{BlendSummary, BlendedSignal, SignalBlender};
use crate::config::EngineConfig;
use crate::context::{ContextChain, ContextInputs};
use crate::estimator::{EstimateMethod, ProbabilityEstimator};
use crate::injury::InjuryContext;
use crate::model::{
    Direction, Factor, GameStatLine, HustleAggregate, LineRange, SeasonAggregate, SeasonType,
    StatSelection,
};
use crate::sweep::{SweepEntry, sweep_lines};

/// Everything one prediction needs, already fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropInputs {
    #[serde(default)]
    pub player_name: String,
    pub selection: StatSelection,
    #[serde(default)]
    pub season_type: SeasonType,
    /// Merged Base + Advanced aggregate for the player.
    #[serde(default)]
    pub player: SeasonAggregate,
    #[serde(default)]
    pub defender_name: Option<String>,
    #[serde(default)]
    pub defender: Option<SeasonAggregate>,
    #[serde(default)]
    pub opponent: String,
    /// Game log, most recent first.
    #[serde(default)]
    pub games: Vec<GameStatLine>,
    #[serde(default)]
    pub injury: InjuryContext,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub hustle: Option<HustleAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub selection: StatSelection,
    pub line: f64,
    pub direction: Direction,
    pub probability: f64,
    pub raw_probability: f64,
    pub method: EstimateMethod,
    pub blend: BlendSummary,
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub selection: StatSelection,
    pub direction: Direction,
    pub range: LineRange,
    pub entries: Vec<SweepEntry>,
    pub blend: BlendSummary,
    pub factors: Vec<Factor>,
}

impl SweepResult {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }
}

/// Stateless scorer. Same inputs, same outputs.
#[derive(Debug, Clone, Default)]
pub struct PropEngine {
    config: EngineConfig,
}

struct Prepared {
    blend: BlendedSignal,
    chain: ContextChain,
}

impl PropEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn estimator(&self) -> ProbabilityEstimator {
        ProbabilityEstimator::new(self.config.min_empirical_samples)
    }

    fn prepare(&self, inputs: &PropInputs) -> Prepared {
        let injury_multiplier = inputs.injury.multiplier(self.config.injury_usage_weight);
        let baseline = inputs.selection.season_total(&inputs.player);

        let blender = SignalBlender::new(self.config.weights, self.config.blend_window());
        let blend = blender.blend(
            inputs.selection,
            baseline,
            &inputs.games,
            &inputs.opponent,
            injury_multiplier,
        );

        let chain = ContextChain::build(
            &ContextInputs {
                player: Some(&inputs.player),
                defender: inputs.defender.as_ref(),
                injury_multiplier,
                last_game_date: inputs.games.first().map(|g| g.game_date.as_str()),
                as_of: inputs.as_of,
            },
            &self.config.league,
        );

        Prepared { blend, chain }
    }

    pub fn predict(&self, inputs: &PropInputs, line: f64, direction: Direction) -> PredictionResult {
        let Prepared { blend, chain } = self.prepare(inputs);
        let est = self.estimator().estimate(
            &blend.sample,
            blend.summary.blended_mean,
            blend.summary.blended_std,
            line,
            direction,
        );
        let probability = chain.apply(est.probability);

        info!(
            player = %inputs.player_name,
            selection = %inputs.selection,
            line,
            direction = %direction,
            method = est.method.label(),
            raw = est.probability,
            probability,
            "prediction"
        );

        PredictionResult {
            selection: inputs.selection,
            line,
            direction,
            probability,
            raw_probability: est.probability,
            method: est.method,
            blend: blend.summary,
            factors: chain.factors().to_vec(),
        }
    }

    pub fn sweep(&self, inputs: &PropInputs, range: LineRange, direction: Direction) -> SweepResult {
        let Prepared { blend, chain } = self.prepare(inputs);
        let entries = sweep_lines(
            &self.estimator(),
            &chain,
            &blend.sample,
            blend.summary.blended_mean,
            blend.summary.blended_std,
            range,
            direction,
        );

        if let Some(top) = entries.first() {
            info!(
                player = %inputs.player_name,
                selection = %inputs.selection,
                direction = %direction,
                lines = entries.len(),
                best_line = top.line,
                best_probability = top.probability,
                "sweep"
            );
        }

        SweepResult {
            selection: inputs.selection,
            direction,
            range,
            entries,
            blend: blend.summary,
            factors: chain.factors().to_vec(),
        }
    }
}

fn write_breakdown(f: &mut fmt::Formatter<'_>, blend: &BlendSummary, factors: &[Factor]) -> fmt::Result {
    writeln!(f, "Breakdown of factors:")?;
    writeln!(f, "  Baseline per-game:       {:.1}", blend.baseline)?;
    writeln!(
        f,
        "  Recent mean/std:         {:.1} / {:.1} ({} games)",
        blend.recent_mean, blend.recent_std, blend.recent_games
    )?;
    if blend.h2h_games > 0 {
        writeln!(
            f,
            "  H2H mean:                {:.1} ({} games)",
            blend.h2h_mean, blend.h2h_games
        )?;
    }
    writeln!(f, "  Blended mean:            {:.1}", blend.blended_mean)?;
    writeln!(f, "  Std used:                {:.1}", blend.blended_std)?;
    for factor in factors {
        writeln!(f, "  {:<24} {:.3}x", format!("{}:", factor.kind.label()), factor.value)?;
    }
    Ok(())
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Line: {} {} {}", self.selection, self.direction, self.line)?;
        writeln!(
            f,
            "Estimated probability: {:.2}% (raw {:.2}%, {})",
            self.probability * 100.0,
            self.raw_probability * 100.0,
            self.method.label()
        )?;
        write_breakdown(f, &self.blend, &self.factors)
    }
}

impl fmt::Display for SweepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sweep: {} {} lines {}..={}",
            self.selection,
            self.direction,
            self.range.min(),
            self.range.max()
        )?;
        for e in &self.entries {
            writeln!(f, "  {:>6.1}  {:>6.2}%", e.line, e.probability * 100.0)?;
        }
        write_breakdown(f, &self.blend, &self.factors)
    }
}
