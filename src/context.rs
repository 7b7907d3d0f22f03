use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Factor, FactorKind, SeasonAggregate};

pub const BACK_TO_BACK_MULTIPLIER: f64 = 0.90;
pub const SHORT_REST_MULTIPLIER: f64 = 0.98;
pub const NORMAL_REST_MULTIPLIER: f64 = 1.02;
// No home/away signal is modelled yet; the slot keeps the chain shape stable.
pub const HOME_COURT_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueBaselines {
    pub off_rating: f64,
    pub def_rating: f64,
    pub pace: f64,
}

impl Default for LeagueBaselines {
    fn default() -> Self {
        Self {
            off_rating: 110.0,
            def_rating: 110.0,
            pace: 100.0,
        }
    }
}

pub fn offensive_factor(off_rating: Option<f64>, league: &LeagueBaselines) -> f64 {
    usable(off_rating).map_or(1.0, |r| r / league.off_rating)
}

pub fn pace_factor(pace: Option<f64>, league: &LeagueBaselines) -> f64 {
    usable(pace).map_or(1.0, |p| p / league.pace)
}

/// League average divided by the defender's rating.
///
/// A lower (stronger) defender rating yields a factor above 1, which looks backwards.
/// The direction is kept intentionally; see the defensive factor note in DESIGN.md.
pub fn defensive_factor(def_rating: Option<f64>, league: &LeagueBaselines) -> f64 {
    usable(def_rating).map_or(1.0, |r| league.def_rating / r)
}

fn usable(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

pub fn rest_multiplier(days_since_last_game: Option<i64>) -> f64 {
    match days_since_last_game {
        Some(0) => BACK_TO_BACK_MULTIPLIER,
        Some(1) => SHORT_REST_MULTIPLIER,
        _ => NORMAL_REST_MULTIPLIER,
    }
}

/// Days between the last played game and `as_of`. Future dates count as unknown.
pub fn days_since(last_game_date: &str, as_of: NaiveDate) -> Option<i64> {
    let played = parse_game_date(last_game_date)?;
    let days = (as_of - played).num_days();
    (days >= 0).then_some(days)
}

/// Game dates show up as `2025-04-13`, `APR 13, 2025`, `04/13/2025` or an ISO timestamp.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

#[derive(Debug, Clone, Copy)]
pub struct ContextInputs<'a> {
    pub player: Option<&'a SeasonAggregate>,
    pub defender: Option<&'a SeasonAggregate>,
    pub injury_multiplier: f64,
    pub last_game_date: Option<&'a str>,
    pub as_of: Option<NaiveDate>,
}

/// The six adjustment factors, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextChain {
    factors: Vec<Factor>,
}

impl ContextChain {
    pub fn build(inputs: &ContextInputs<'_>, league: &LeagueBaselines) -> Self {
        let days = match (inputs.last_game_date, inputs.as_of) {
            (Some(last), Some(as_of)) => days_since(last, as_of),
            _ => None,
        };

        let factors = vec![
            Factor {
                kind: FactorKind::OffensiveRating,
                value: offensive_factor(inputs.player.and_then(|p| p.off_rating), league),
            },
            Factor {
                kind: FactorKind::Pace,
                value: pace_factor(inputs.player.and_then(|p| p.pace), league),
            },
            Factor {
                kind: FactorKind::Defense,
                value: defensive_factor(inputs.defender.and_then(|d| d.def_rating), league),
            },
            Factor {
                kind: FactorKind::InjuryUsage,
                value: inputs.injury_multiplier,
            },
            Factor {
                kind: FactorKind::Rest,
                value: rest_multiplier(days),
            },
            Factor {
                kind: FactorKind::HomeCourt,
                value: HOME_COURT_MULTIPLIER,
            },
        ];

        debug!(?days, ?factors, "context chain built");
        Self { factors }
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn combined(&self) -> f64 {
        self.factors.iter().map(|f| f.value).product()
    }

    /// Multiplies the raw probability through every factor in order, then clamps.
    pub fn apply(&self, raw_probability: f64) -> f64 {
        let adjusted = self
            .factors
            .iter()
            .fold(raw_probability, |p, f| p * f.value);
        clamp_probability(adjusted)
    }
}

pub fn clamp_probability(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rest_table() {
        assert_eq!(rest_multiplier(Some(0)), 0.90);
        assert_eq!(rest_multiplier(Some(1)), 0.98);
        assert_eq!(rest_multiplier(Some(2)), 1.02);
        assert_eq!(rest_multiplier(Some(3)), 1.02);
        assert_eq!(rest_multiplier(None), 1.02);
    }

    #[test]
    fn days_since_handles_formats_and_garbage() {
        let as_of = date(2025, 4, 16);
        assert_eq!(days_since("2025-04-13", as_of), Some(3));
        assert_eq!(days_since("APR 15, 2025", as_of), Some(1));
        assert_eq!(days_since("04/16/2025", as_of), Some(0));
        assert_eq!(days_since("2025-04-14T00:00:00", as_of), Some(2));
        assert_eq!(days_since("not a date", as_of), None);
        assert_eq!(days_since("2025-04-20", as_of), None);
        assert_eq!(rest_multiplier(days_since("??", as_of)), 1.02);
    }

    #[test]
    fn missing_ratings_are_neutral() {
        let league = LeagueBaselines::default();
        assert_eq!(offensive_factor(None, &league), 1.0);
        assert_eq!(pace_factor(None, &league), 1.0);
        assert_eq!(defensive_factor(None, &league), 1.0);
        assert_eq!(defensive_factor(Some(0.0), &league), 1.0);
    }

    #[test]
    fn stronger_defender_inflates_the_factor() {
        let league = LeagueBaselines::default();
        assert!(defensive_factor(Some(100.0), &league) > 1.0);
        assert!(defensive_factor(Some(120.0), &league) < 1.0);
        assert!((offensive_factor(Some(121.0), &league) - 1.1).abs() < 1e-12);
        assert!((pace_factor(Some(95.0), &league) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn chain_is_ordered_and_clamped() {
        let player = SeasonAggregate {
            off_rating: Some(121.0),
            pace: Some(104.0),
            ..Default::default()
        };
        let defender = SeasonAggregate {
            def_rating: Some(105.0),
            ..Default::default()
        };
        let chain = ContextChain::build(
            &ContextInputs {
                player: Some(&player),
                defender: Some(&defender),
                injury_multiplier: 1.2,
                last_game_date: Some("2025-04-15"),
                as_of: Some(date(2025, 4, 16)),
            },
            &LeagueBaselines::default(),
        );
        let kinds: Vec<_> = chain.factors().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FactorKind::OffensiveRating,
                FactorKind::Pace,
                FactorKind::Defense,
                FactorKind::InjuryUsage,
                FactorKind::Rest,
                FactorKind::HomeCourt,
            ]
        );
        assert_eq!(chain.factors()[4].value, 0.98);
        assert!(chain.combined() > 1.0);
        assert_eq!(chain.apply(0.95), 1.0);
        let p = chain.apply(0.4);
        assert!((p - 0.4 * chain.combined()).abs() < 1e-12);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_probability(f64::NAN), 0.0);
        assert_eq!(clamp_probability(-0.2), 0.0);
        assert_eq!(clamp_probability(1.7), 1.0);
    }
}
