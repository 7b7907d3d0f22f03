use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::PropInputs;
use crate::injury::{InjuredPlayer, InjuryContext};
use crate::model::{BoxScore, GameStatLine, SeasonAggregate, SeasonType, StatSelection};

const OPPONENTS: &[&str] = &["LAL", "BOS", "DEN", "PHX", "MIA", "DAL", "SAC", "MIN"];
const SYNTHETIC_TEAM: &str = "SYN";

/// Per-game center of the generated box scores.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticProfile {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub spread: f64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            points: 24.0,
            rebounds: 6.0,
            assists: 5.0,
            spread: 0.3,
        }
    }
}

/// Seeded game log, most recent first, one game every other day ending at `last_game`.
pub fn synthetic_game_log(
    seed: u64,
    games: usize,
    profile: SyntheticProfile,
    last_game: NaiveDate,
) -> Vec<GameStatLine> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..games)
        .map(|i| {
            let date = last_game - Duration::days(2 * i as i64);
            let opp = OPPONENTS[rng.gen_range(0..OPPONENTS.len())];
            let home = rng.gen_bool(0.5);
            let matchup = if home {
                format!("{SYNTHETIC_TEAM} vs. {opp}")
            } else {
                format!("{SYNTHETIC_TEAM} @ {opp}")
            };
            let mut draw = |center: f64| {
                let lo = center * (1.0 - profile.spread);
                let hi = center * (1.0 + profile.spread);
                rng.gen_range(lo..=hi).round().max(0.0)
            };
            let pts = draw(profile.points);
            let reb = draw(profile.rebounds);
            let ast = draw(profile.assists);
            let fga = (pts / 1.1).round().max(1.0);
            let stats = BoxScore {
                pts,
                reb,
                ast,
                fga,
                fgm: (fga * 0.48).round(),
                fta: (pts * 0.2).round(),
                ftm: (pts * 0.16).round(),
                ..Default::default()
            };
            let minutes = rng.gen_range(28.0..38.0);
            GameStatLine::new(date.format("%Y-%m-%d").to_string(), matchup, minutes, stats)
        })
        .collect()
}

/// Ready-to-score inputs for quick manual tuning without any payloads.
pub fn synthetic_inputs(seed: u64) -> PropInputs {
    let profile = SyntheticProfile::default();
    let last_game = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default();
    let games = synthetic_game_log(seed, 40, profile, last_game);

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let player = SeasonAggregate {
        games_played: Some(60.0),
        points: Some(profile.points),
        rebounds: Some(profile.rebounds),
        assists: Some(profile.assists),
        off_rating: Some(rng.gen_range(104.0..120.0)),
        pace: Some(rng.gen_range(96.0..104.0)),
        usage_pct: Some(rng.gen_range(22.0..32.0)),
        ..SeasonAggregate::empty(SeasonType::RegularSeason)
    };
    let defender = SeasonAggregate {
        def_rating: Some(rng.gen_range(104.0..118.0)),
        ..SeasonAggregate::empty(SeasonType::RegularSeason)
    };
    let injury = InjuryContext {
        team: SYNTHETIC_TEAM.to_string(),
        players: vec![InjuredPlayer {
            name: "Synthetic Reserve".to_string(),
            usage: Ok(rng.gen_range(10.0..20.0)),
        }],
    };

    PropInputs {
        player_name: "Synthetic Player".to_string(),
        selection: StatSelection::PRA,
        season_type: SeasonType::RegularSeason,
        player,
        defender_name: Some("Synthetic Defender".to_string()),
        defender: Some(defender),
        opponent: OPPONENTS[0].to_string(),
        games,
        injury,
        as_of: Some(last_game + Duration::days(2)),
        hustle: None,
    }
}
