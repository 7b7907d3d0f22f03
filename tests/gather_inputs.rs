use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use nba_prop_lines::config::EngineConfig;
use nba_prop_lines::engine::PropEngine;
use nba_prop_lines::error::PropError;
use nba_prop_lines::estimator::EstimateMethod;
use nba_prop_lines::injury::UsageLookupError;
use nba_prop_lines::model::{
    Direction, FactorKind, GameStatLine, MeasureType, RosterEntry, SeasonAggregate, SeasonType,
    StatSelection,
};
use nba_prop_lines::payload::PayloadDirSource;
use nba_prop_lines::source::{
    IdentityMap, MatchupRequest, MemorySource, StatsSource, gather_inputs, today,
};

fn payload_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("payload_dir");
    path
}

fn curry_request() -> MatchupRequest {
    MatchupRequest {
        player: "stephen curry".into(),
        team: "GSW".into(),
        opponent: "lal".into(),
        selection: StatSelection::PRA,
        season_type: SeasonType::RegularSeason,
        injury_team: "GSW".into(),
        defender: None,
        as_of: NaiveDate::from_ymd_opt(2025, 4, 13),
    }
}

#[test]
fn payload_dir_builds_identities() {
    let source = PayloadDirSource::open(payload_dir()).expect("fixture dir opens");
    assert_eq!(source.players().len(), 4);
    assert_eq!(source.identities().resolve("Stephen Curry"), Some(201939));
    assert_eq!(source.identities().resolve("dangelo russell"), Some(203507));
}

#[test]
fn payload_dir_missing_and_malformed_files_are_absences() {
    let source = PayloadDirSource::open(payload_dir()).unwrap();
    assert!(source
        .season_aggregate(203507, MeasureType::Base, SeasonType::RegularSeason)
        .is_none());
    assert!(source.recent_games(201939, SeasonType::Playoffs, 10).is_empty());
    assert!(source.injuries("LAL").is_empty());
    assert!(source.roster("BOS").is_empty());
}

#[test]
fn open_fails_without_player_index() {
    let mut dir = payload_dir();
    dir.push("teams");
    assert!(PayloadDirSource::open(dir).is_err());
}

#[test]
fn gathers_everything_from_payload_dir() {
    let source = PayloadDirSource::open(payload_dir()).unwrap();
    let config = EngineConfig::default();
    let inputs = gather_inputs(&source, source.identities(), &curry_request(), &config)
        .expect("player resolves");

    assert_eq!(inputs.opponent, "LAL");
    assert_eq!(inputs.player.points, Some(24.5));
    assert_eq!(inputs.player.off_rating, Some(115.5));
    assert!((inputs.selection.season_total(&inputs.player) - 34.9).abs() < 1e-9);
    assert_eq!(inputs.games.len(), 12);
    assert_eq!(inputs.games[0].game_date, "APR 11, 2025");

    assert_eq!(inputs.defender_name.as_deref(), Some("D'Angelo Russell"));
    assert_eq!(inputs.defender.as_ref().and_then(|d| d.def_rating), Some(114.4));

    assert_eq!(inputs.injury.team, "GSW");
    assert_eq!(inputs.injury.players.len(), 2);
    assert_eq!(inputs.injury.resolved_count(), 1);
    assert_eq!(
        inputs.injury.players[1].usage,
        Err(UsageLookupError::UnknownPlayer)
    );
    assert!((inputs.injury.total_usage() - 0.262).abs() < 1e-12);

    let hustle = inputs.hustle.as_ref().expect("hustle row");
    assert_eq!(hustle.deflections, 2.1);
}

#[test]
fn payload_inputs_score_end_to_end() {
    let source = PayloadDirSource::open(payload_dir()).unwrap();
    let config = EngineConfig::default();
    let inputs = gather_inputs(&source, source.identities(), &curry_request(), &config).unwrap();
    let engine = PropEngine::new(config);

    let result = engine.predict(&inputs, 34.5, Direction::Over);
    assert!((0.0..=1.0).contains(&result.probability));
    assert_eq!(result.method, EstimateMethod::Empirical);
    assert_eq!(result.blend.recent_games, 5);
    assert_eq!(result.blend.h2h_games, 3);

    let def = result
        .factors
        .iter()
        .find(|f| f.kind == FactorKind::Defense)
        .unwrap();
    assert!((def.value - 110.0 / 114.4).abs() < 1e-12);
    let rest = result
        .factors
        .iter()
        .find(|f| f.kind == FactorKind::Rest)
        .unwrap();
    // APR 11 -> APR 13 is two days
    assert_eq!(rest.value, 1.02);
}

#[test]
fn unknown_player_is_fatal() {
    let source = MemorySource::default();
    let ids = IdentityMap::default();
    let mut req = curry_request();
    req.player = "Nobody Special".into();
    let err = gather_inputs(&source, &ids, &req, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, PropError::PlayerNotFound(name) if name == "Nobody Special"));
}

#[test]
fn missing_data_degrades_to_defaults() {
    let mut ids = IdentityMap::default();
    ids.insert("Stephen Curry", 1);
    let source = MemorySource::default();

    let inputs = gather_inputs(&source, &ids, &curry_request(), &EngineConfig::default()).unwrap();
    assert_eq!(inputs.player, {
        let mut empty = SeasonAggregate::empty(SeasonType::RegularSeason);
        empty.player_id = Some(1);
        empty
    });
    assert!(inputs.games.is_empty());
    assert!(inputs.defender.is_none());
    assert!(inputs.defender_name.is_none());
    assert!(inputs.injury.players.is_empty());

    let result = PropEngine::default().predict(&inputs, 0.5, Direction::Over);
    assert_eq!(result.probability, 0.0);
    assert!(result.factors.iter().all(|f| f.value > 0.0));
}

#[test]
fn explicit_defender_overrides_position_and_unknown_defender_stays_neutral() {
    let mut ids = IdentityMap::default();
    ids.insert("Stephen Curry", 1);
    ids.insert("Chosen Wing", 2);
    let mut source = MemorySource::default();
    source.set_roster(
        "GSW",
        vec![RosterEntry {
            name: "Stephen Curry".into(),
            position: "PG".into(),
        }],
    );
    source.set_aggregate(
        2,
        MeasureType::Advanced,
        SeasonType::RegularSeason,
        SeasonAggregate {
            def_rating: Some(105.0),
            ..Default::default()
        },
    );
    source.set_games(
        1,
        SeasonType::RegularSeason,
        vec![GameStatLine::new("2025-04-12", "GSW @ LAL", 30.0, Default::default())],
    );

    let mut req = curry_request();
    req.defender = Some("Chosen Wing".into());
    let inputs = gather_inputs(&source, &ids, &req, &EngineConfig::default()).unwrap();
    assert_eq!(inputs.defender.as_ref().and_then(|d| d.def_rating), Some(105.0));

    req.defender = Some("Mystery Man".into());
    let inputs = gather_inputs(&source, &ids, &req, &EngineConfig::default()).unwrap();
    assert_eq!(inputs.defender_name.as_deref(), Some("Mystery Man"));
    assert!(inputs.defender.is_none());

    let result = PropEngine::default().predict(&inputs, 10.0, Direction::Under);
    let rest = result
        .factors
        .iter()
        .find(|f| f.kind == FactorKind::Rest)
        .unwrap();
    // played the day before as_of
    assert_eq!(rest.value, 0.98);
}

#[test]
fn missing_as_of_counts_rest_up_to_today() {
    let source = PayloadDirSource::open(payload_dir()).unwrap();
    let mut req = curry_request();
    req.as_of = None;
    let inputs = gather_inputs(&source, source.identities(), &req, &EngineConfig::default()).unwrap();
    assert_eq!(inputs.as_of, Some(today()));

    let mut ids = IdentityMap::default();
    ids.insert("Stephen Curry", 1);
    let mut source = MemorySource::default();
    let played = Local::now().date_naive().format("%Y-%m-%d").to_string();
    source.set_games(
        1,
        SeasonType::RegularSeason,
        vec![GameStatLine::new(&played, "GSW vs. LAL", 30.0, Default::default())],
    );
    let inputs = gather_inputs(&source, &ids, &req, &EngineConfig::default()).unwrap();
    let result = PropEngine::default().predict(&inputs, 10.0, Direction::Under);
    let rest = result
        .factors
        .iter()
        .find(|f| f.kind == FactorKind::Rest)
        .unwrap();
    // a game earlier today is a back-to-back
    assert_eq!(rest.value, 0.90);
}
