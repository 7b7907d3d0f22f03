use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{MeasureType, SeasonType};
use crate::source::{IdentityMap, StatsSource};

pub const DEFAULT_INJURY_USAGE_WEIGHT: f64 = 0.01;

/// Why an injured player's usage could not be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UsageLookupError {
    #[error("player could not be resolved")]
    UnknownPlayer,
    #[error("no advanced season aggregate")]
    NoAdvancedAggregate,
    #[error("advanced aggregate has no usage")]
    NoUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuredPlayer {
    pub name: String,
    pub usage: Result<f64, UsageLookupError>,
}

/// Injured players for one explicitly chosen team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjuryContext {
    pub team: String,
    #[serde(default)]
    pub players: Vec<InjuredPlayer>,
}

impl InjuryContext {
    pub fn empty(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            players: Vec::new(),
        }
    }

    /// Sum of usage over the players whose lookup succeeded; failures are skipped.
    pub fn total_usage(&self) -> f64 {
        self.players
            .iter()
            .filter_map(|p| p.usage.as_ref().ok())
            .sum()
    }

    pub fn resolved_count(&self) -> usize {
        self.players.iter().filter(|p| p.usage.is_ok()).count()
    }

    pub fn multiplier(&self, weight: f64) -> f64 {
        injury_usage_multiplier(self.total_usage(), weight)
    }
}

/// `1 + total_usage * weight`: more sidelined usage, bigger multiplier.
pub fn injury_usage_multiplier(total_usage: f64, weight: f64) -> f64 {
    1.0 + total_usage * weight
}

/// Looks up each injured player's advanced usage for `season`.
///
/// Individual failures are logged and recorded, never fatal.
pub fn collect_injury_context<S>(
    source: &S,
    identities: &IdentityMap,
    team: &str,
    season: SeasonType,
) -> InjuryContext
where
    S: StatsSource + ?Sized,
{
    let team = team.trim().to_ascii_uppercase();
    let players = source
        .injuries(&team)
        .into_iter()
        .map(|name| {
            let usage = lookup_usage(source, identities, &name, season);
            match &usage {
                Ok(u) => debug!(player = %name, usage = u, "injured player usage"),
                Err(err) => warn!(player = %name, %err, "skipping injured player"),
            }
            InjuredPlayer { name, usage }
        })
        .collect();
    InjuryContext { team, players }
}

fn lookup_usage<S>(
    source: &S,
    identities: &IdentityMap,
    name: &str,
    season: SeasonType,
) -> Result<f64, UsageLookupError>
where
    S: StatsSource + ?Sized,
{
    let id = identities
        .resolve(name)
        .ok_or(UsageLookupError::UnknownPlayer)?;
    let adv = source
        .season_aggregate(id, MeasureType::Advanced, season)
        .ok_or(UsageLookupError::NoAdvancedAggregate)?;
    adv.usage_pct
        .filter(|u| u.is_finite())
        .ok_or(UsageLookupError::NoUsage)
}
