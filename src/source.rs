use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::PropInputs;
use crate::error::PropError;
use crate::injury::collect_injury_context;
use crate::model::{
    GameStatLine, HustleAggregate, MeasureType, PlayerId, RosterEntry, SeasonAggregate,
    SeasonType, StatSelection,
};

/// Already-resolved data acquisition. Absence is a normal answer, not an error.
pub trait StatsSource {
    fn season_aggregate(
        &self,
        id: PlayerId,
        measure: MeasureType,
        season: SeasonType,
    ) -> Option<SeasonAggregate>;

    fn hustle_aggregate(&self, id: PlayerId, season: SeasonType) -> Option<HustleAggregate>;

    /// Most recent first, at most `count` games.
    fn recent_games(&self, id: PlayerId, season: SeasonType, count: usize) -> Vec<GameStatLine>;

    fn roster(&self, team: &str) -> Vec<RosterEntry>;

    fn injuries(&self, team: &str) -> Vec<String>;
}

/// Name-to-id lookup handed in by the caller for the lifetime of one request.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    by_name: HashMap<String, PlayerId>,
}

impl IdentityMap {
    pub fn insert(&mut self, name: &str, id: PlayerId) {
        let key = normalize_name(name);
        if key.is_empty() {
            return;
        }
        if let Some(prev) = self.by_name.insert(key, id)
            && prev != id
        {
            debug!(player = %name, previous = prev, id, "name collision, later id wins");
        }
    }

    pub fn resolve(&self, name: &str) -> Option<PlayerId> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, PlayerId)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, PlayerId)>>(iter: I) -> Self {
        let mut map = IdentityMap::default();
        for (name, id) in iter {
            map.insert(name, id);
        }
        map
    }
}

/// Lowercase, drop `.` and `'`, hyphens to spaces, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '.' && *c != '\'')
        .map(|c| if c == '-' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn team_key(team: &str) -> String {
    team.trim().to_ascii_uppercase()
}

/// HashMap-backed source, handy for tests and synthetic runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    aggregates: HashMap<(PlayerId, MeasureType, SeasonType), SeasonAggregate>,
    hustle: HashMap<(PlayerId, SeasonType), HustleAggregate>,
    games: HashMap<(PlayerId, SeasonType), Vec<GameStatLine>>,
    rosters: HashMap<String, Vec<RosterEntry>>,
    injuries: HashMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn set_aggregate(
        &mut self,
        id: PlayerId,
        measure: MeasureType,
        season: SeasonType,
        aggregate: SeasonAggregate,
    ) {
        self.aggregates.insert((id, measure, season), aggregate);
    }

    pub fn set_hustle(&mut self, id: PlayerId, season: SeasonType, hustle: HustleAggregate) {
        self.hustle.insert((id, season), hustle);
    }

    pub fn set_games(&mut self, id: PlayerId, season: SeasonType, games: Vec<GameStatLine>) {
        self.games.insert((id, season), games);
    }

    pub fn set_roster(&mut self, team: &str, roster: Vec<RosterEntry>) {
        self.rosters.insert(team_key(team), roster);
    }

    pub fn set_injuries(&mut self, team: &str, names: Vec<String>) {
        self.injuries.insert(team_key(team), names);
    }
}

impl StatsSource for MemorySource {
    fn season_aggregate(
        &self,
        id: PlayerId,
        measure: MeasureType,
        season: SeasonType,
    ) -> Option<SeasonAggregate> {
        self.aggregates.get(&(id, measure, season)).cloned()
    }

    fn hustle_aggregate(&self, id: PlayerId, season: SeasonType) -> Option<HustleAggregate> {
        self.hustle.get(&(id, season)).cloned()
    }

    fn recent_games(&self, id: PlayerId, season: SeasonType, count: usize) -> Vec<GameStatLine> {
        self.games
            .get(&(id, season))
            .map(|g| g.iter().take(count).cloned().collect())
            .unwrap_or_default()
    }

    fn roster(&self, team: &str) -> Vec<RosterEntry> {
        self.rosters.get(&team_key(team)).cloned().unwrap_or_default()
    }

    fn injuries(&self, team: &str) -> Vec<String> {
        self.injuries.get(&team_key(team)).cloned().unwrap_or_default()
    }
}

/// One hypothetical matchup to score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupRequest {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub selection: StatSelection,
    #[serde(default)]
    pub season_type: SeasonType,
    /// Team whose injury list feeds the usage multiplier. Never inferred.
    pub injury_team: String,
    /// Explicit defender; otherwise the first opponent at the player's position.
    #[serde(default)]
    pub defender: Option<String>,
    /// Game date the rest factor counts up to. Defaults to today's local date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl MatchupRequest {
    pub fn game_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(today)
    }
}

/// Local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// First roster entry sharing `position` (case-insensitive). Blank positions never match.
pub fn find_positional_defender<'a>(
    roster: &'a [RosterEntry],
    position: &str,
) -> Option<&'a RosterEntry> {
    let want = position.trim();
    if want.is_empty() {
        return None;
    }
    roster
        .iter()
        .find(|e| e.position.trim().eq_ignore_ascii_case(want))
}

/// Pulls every engine input for `request` out of `source`.
///
/// Only an unknown player is fatal; every other gap degrades to a default.
pub fn gather_inputs<S>(
    source: &S,
    identities: &IdentityMap,
    request: &MatchupRequest,
    config: &EngineConfig,
) -> Result<PropInputs, PropError>
where
    S: StatsSource + ?Sized,
{
    let season = request.season_type;
    let id = identities
        .resolve(&request.player)
        .ok_or_else(|| PropError::PlayerNotFound(request.player.clone()))?;

    let player = merged_aggregate(source, id, season);
    let hustle = source.hustle_aggregate(id, season);
    let games = source.recent_games(id, season, config.games_to_fetch());
    debug!(player = %request.player, id, games = games.len(), "player data gathered");

    let defender_name = request
        .defender
        .clone()
        .or_else(|| positional_defender(source, request));
    let defender = defender_name.as_deref().and_then(|name| match identities.resolve(name) {
        Some(did) => Some(merged_aggregate(source, did, season)),
        None => {
            warn!(defender = %name, "defender not resolvable, defensive factor stays neutral");
            None
        }
    });
    if defender_name.is_none() {
        warn!(player = %request.player, opponent = %request.opponent, "no defender found");
    }

    let injury = collect_injury_context(source, identities, &request.injury_team, season);
    info!(
        player = %request.player,
        opponent = %team_key(&request.opponent),
        injured = injury.players.len(),
        injured_resolved = injury.resolved_count(),
        "inputs ready"
    );

    Ok(PropInputs {
        player_name: request.player.clone(),
        selection: request.selection,
        season_type: season,
        player,
        defender_name,
        defender,
        opponent: team_key(&request.opponent),
        games,
        injury,
        as_of: Some(request.game_date()),
        hustle,
    })
}

fn merged_aggregate<S>(source: &S, id: PlayerId, season: SeasonType) -> SeasonAggregate
where
    S: StatsSource + ?Sized,
{
    let base = source.season_aggregate(id, MeasureType::Base, season);
    let adv = source.season_aggregate(id, MeasureType::Advanced, season);
    let mut merged = match (base, adv) {
        (Some(b), Some(a)) => b.merge(a),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => SeasonAggregate::empty(season),
    };
    merged.player_id = Some(id);
    merged.season_type = season;
    merged
}

fn positional_defender<S>(source: &S, request: &MatchupRequest) -> Option<String>
where
    S: StatsSource + ?Sized,
{
    let own = source.roster(&request.team);
    let wanted = normalize_name(&request.player);
    let position = own
        .iter()
        .find(|e| normalize_name(&e.name) == wanted)
        .map(|e| e.position.clone())?;
    let opp = source.roster(&request.opponent);
    find_positional_defender(&opp, &position).map(|e| e.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_compacts() {
        assert_eq!(normalize_name("  Shai  Gilgeous-Alexander "), "shai gilgeous alexander");
        assert_eq!(normalize_name("D'Angelo Russell"), "dangelo russell");
        assert_eq!(normalize_name("P.J. Washington"), "pj washington");
    }

    #[test]
    fn identity_map_resolves_loose_spellings() {
        let ids: IdentityMap = [("Jaren Jackson Jr.", 11), ("De'Aaron Fox", 12)]
            .into_iter()
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.resolve("jaren jackson jr"), Some(11));
        assert_eq!(ids.resolve("DeAaron  Fox"), Some(12));
        assert_eq!(ids.resolve("Nobody"), None);
    }

    #[test]
    fn identity_collision_keeps_the_later_id() {
        let mut ids = IdentityMap::default();
        ids.insert("Marcus Morris", 7);
        ids.insert("marcus  morris", 7);
        ids.insert("Marcus Morris.", 9);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.resolve("Marcus Morris"), Some(9));
        ids.insert("  ", 3);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn request_without_date_uses_today() {
        let mut req = MatchupRequest {
            player: "A".into(),
            team: "GSW".into(),
            opponent: "LAL".into(),
            selection: StatSelection::PRA,
            season_type: SeasonType::RegularSeason,
            injury_team: "GSW".into(),
            defender: None,
            as_of: None,
        };
        assert_eq!(req.game_date(), today());
        req.as_of = NaiveDate::from_ymd_opt(2025, 4, 13);
        assert_eq!(req.game_date().to_string(), "2025-04-13");
    }

    #[test]
    fn positional_defender_skips_blank_positions() {
        let roster = vec![
            RosterEntry {
                name: "Bench".into(),
                position: "".into(),
            },
            RosterEntry {
                name: "Wing".into(),
                position: "SF".into(),
            },
            RosterEntry {
                name: "Guard".into(),
                position: "PG".into(),
            },
        ];
        assert_eq!(find_positional_defender(&roster, "pg").unwrap().name, "Guard");
        assert!(find_positional_defender(&roster, "").is_none());
        assert!(find_positional_defender(&roster, "C").is_none());
    }

    #[test]
    fn memory_source_normalizes_team_keys_and_caps_games() {
        let mut src = MemorySource::default();
        src.set_injuries(" gsw", vec!["A".into()]);
        assert_eq!(src.injuries("GSW"), vec!["A".to_string()]);
        let games = (0..8)
            .map(|i| GameStatLine::new("2025-01-01", "X vs. Y", i as f64, Default::default()))
            .collect();
        src.set_games(1, SeasonType::RegularSeason, games);
        assert_eq!(src.recent_games(1, SeasonType::RegularSeason, 3).len(), 3);
        assert!(src.recent_games(1, SeasonType::Playoffs, 3).is_empty());
    }
}
