use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::parse_game_date;
use crate::error::PropError;
use crate::model::{
    BoxScore, GameStatLine, HustleAggregate, MeasureType, PlayerId, RosterEntry, SeasonAggregate,
    SeasonType,
};
use crate::source::{IdentityMap, StatsSource};

/// One stats.nba.com `resultSets` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(header))
    }

    pub fn cell<'a>(&self, row: &'a [Value], header: &str) -> Option<&'a Value> {
        self.column(header).and_then(|i| row.get(i))
    }

    fn number(&self, row: &[Value], header: &str) -> Option<f64> {
        self.cell(row, header).and_then(as_f64)
    }

    fn text(&self, row: &[Value], header: &str) -> Option<String> {
        self.cell(row, header).and_then(as_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIndexEntry {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub team_abbrev: String,
    pub position: String,
}

impl PlayerIndexEntry {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn parse_root(raw: &str) -> crate::error::Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Every table in a `resultSets` (or single `resultSet`) payload, in order.
pub fn parse_result_set_rows(raw: &str) -> crate::error::Result<Vec<ResultTable>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let sets: Vec<&Value> = match root.get("resultSets").or_else(|| root.get("resultSet")) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(one @ Value::Object(_)) => vec![one],
        _ => Vec::new(),
    };
    Ok(sets.into_iter().map(parse_table).collect())
}

fn parse_table(v: &Value) -> ResultTable {
    let name = v
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let headers = v
        .get("headers")
        .and_then(Value::as_array)
        .map(|hs| hs.iter().filter_map(as_string).collect())
        .unwrap_or_default();
    let rows = v
        .get("rowSet")
        .and_then(Value::as_array)
        .map(|rs| {
            rs.iter()
                .filter_map(|r| r.as_array().cloned())
                .collect()
        })
        .unwrap_or_default();
    ResultTable {
        name,
        headers,
        rows,
    }
}

fn first_table(raw: &str) -> crate::error::Result<Option<ResultTable>> {
    Ok(parse_result_set_rows(raw)?.into_iter().next())
}

pub fn parse_player_index_json(raw: &str) -> crate::error::Result<Vec<PlayerIndexEntry>> {
    let Some(table) = first_table(raw)? else {
        return Ok(Vec::new());
    };
    let out = table
        .rows
        .iter()
        .filter_map(|row| {
            let id = table
                .number(row, "PERSON_ID")
                .or_else(|| table.number(row, "PLAYER_ID"))?;
            if id < 0.0 || id.fract() != 0.0 {
                warn!(id, "skipping player index row with a malformed id");
                return None;
            }
            let (first_name, last_name) = match (
                table.text(row, "PLAYER_FIRST_NAME"),
                table.text(row, "PLAYER_LAST_NAME"),
            ) {
                (Some(f), Some(l)) => (f, l),
                _ => {
                    let display = table
                        .text(row, "DISPLAY_FIRST_LAST")
                        .or_else(|| table.text(row, "PLAYER_NAME"))?;
                    match display.split_once(' ') {
                        Some((f, l)) => (f.to_string(), l.to_string()),
                        None => (display, String::new()),
                    }
                }
            };
            Some(PlayerIndexEntry {
                id: id as PlayerId,
                first_name,
                last_name,
                team_abbrev: table.text(row, "TEAM_ABBREVIATION").unwrap_or_default(),
                position: table.text(row, "POSITION").unwrap_or_default(),
            })
        })
        .collect();
    Ok(out)
}

/// Year-over-year dashboard; the last row is the current season.
pub fn parse_dashboard_json(
    raw: &str,
    player_id: PlayerId,
    season: SeasonType,
) -> crate::error::Result<Option<SeasonAggregate>> {
    let Some(table) = first_table(raw)? else {
        return Ok(None);
    };
    let Some(row) = table.rows.last() else {
        return Ok(None);
    };
    let n = |h: &str| table.number(row, h);
    Ok(Some(SeasonAggregate {
        player_id: Some(player_id),
        season_type: season,
        games_played: n("GP"),
        minutes: n("MIN"),
        points: n("PTS"),
        rebounds: n("REB"),
        assists: n("AST"),
        steals: n("STL"),
        blocks: n("BLK"),
        turnovers: n("TOV"),
        fg_pct: n("FG_PCT"),
        fg3_pct: n("FG3_PCT"),
        ft_pct: n("FT_PCT"),
        off_rating: n("OFF_RATING"),
        def_rating: n("DEF_RATING"),
        net_rating: n("NET_RATING"),
        pace: n("PACE"),
        usage_pct: n("USG_PCT"),
        ts_pct: n("TS_PCT"),
        efg_pct: n("EFG_PCT"),
        ast_pct: n("AST_PCT"),
        oreb_pct: n("OREB_PCT"),
        dreb_pct: n("DREB_PCT"),
        reb_pct: n("REB_PCT"),
        pie: n("PIE"),
    }))
}

/// Player game log, most recent first, at most `limit` games.
pub fn parse_game_log_json(raw: &str, limit: usize) -> crate::error::Result<Vec<GameStatLine>> {
    let Some(table) = first_table(raw)? else {
        return Ok(Vec::new());
    };
    let mut games: Vec<GameStatLine> = table
        .rows
        .iter()
        .map(|row| {
            let n = |h: &str| table.number(row, h).unwrap_or(0.0);
            let stats = BoxScore {
                pts: n("PTS"),
                reb: n("REB"),
                ast: n("AST"),
                stl: n("STL"),
                blk: n("BLK"),
                tov: n("TOV"),
                pf: n("PF"),
                oreb: n("OREB"),
                dreb: n("DREB"),
                fgm: n("FGM"),
                fga: n("FGA"),
                fg3m: n("FG3M"),
                fg3a: n("FG3A"),
                ftm: n("FTM"),
                fta: n("FTA"),
            };
            let minutes = table.cell(row, "MIN").and_then(parse_minutes).unwrap_or(0.0);
            GameStatLine::new(
                table.text(row, "GAME_DATE").unwrap_or_default(),
                table.text(row, "MATCHUP").unwrap_or_default(),
                minutes,
                stats,
            )
        })
        .collect();

    // Logs normally arrive newest first; enforce it when every date parses.
    let dates: Option<Vec<_>> = games.iter().map(|g| parse_game_date(&g.game_date)).collect();
    if let Some(dates) = dates {
        let mut keyed: Vec<_> = dates.into_iter().zip(games).collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        games = keyed.into_iter().map(|(_, g)| g).collect();
    }
    games.truncate(limit);
    Ok(games)
}

/// League-wide hustle table; picks the row for `player_id`.
pub fn parse_hustle_json(
    raw: &str,
    player_id: PlayerId,
    season: SeasonType,
) -> crate::error::Result<Option<HustleAggregate>> {
    let Some(table) = first_table(raw)? else {
        return Ok(None);
    };
    let row = table
        .rows
        .iter()
        .find(|row| table.number(row, "PLAYER_ID") == Some(player_id as f64));
    Ok(row.map(|row| {
        let n = |h: &str| table.number(row, h).unwrap_or(0.0);
        HustleAggregate {
            player_id: Some(player_id),
            season_type: season,
            contested_shots: n("CONTESTED_SHOTS"),
            deflections: n("DEFLECTIONS"),
            charges_drawn: n("CHARGES_DRAWN"),
            screen_assists: n("SCREEN_ASSISTS"),
            loose_balls_recovered: n("LOOSE_BALLS_RECOVERED"),
            off_boxouts: n("OFF_BOXOUTS"),
            def_boxouts: n("DEF_BOXOUTS"),
        }
    }))
}

pub fn parse_espn_roster_json(raw: &str) -> crate::error::Result<Vec<RosterEntry>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let entries = if let Value::Array(items) = &root {
        items.as_slice()
    } else {
        const PATHS: [&[&str]; 5] = [
            &["roster", "entries"],
            &["entries"],
            &["athletes"],
            &["players"],
            &["roster"],
        ];
        PATHS
            .iter()
            .find_map(|path| walk(&root, path).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default()
    };

    let out = entries
        .iter()
        .filter_map(|entry| {
            let athlete = entry.get("athlete").unwrap_or(entry);
            let name = athlete_name(athlete)?;
            let position = athlete
                .get("position")
                .and_then(|p| p.get("abbreviation"))
                .and_then(as_string)
                .unwrap_or_default();
            Some(RosterEntry { name, position })
        })
        .collect();
    Ok(out)
}

pub fn parse_espn_injuries_json(raw: &str) -> crate::error::Result<Vec<String>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let entries: &[Value] = match &root {
        Value::Array(items) => items,
        other => match other.get("injuries") {
            Some(Value::Array(items)) => items,
            Some(inj @ Value::Object(_)) => inj
                .get("entries")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        },
    };
    Ok(entries
        .iter()
        .filter_map(|e| e.get("athlete").and_then(athlete_name))
        .collect())
}

fn athlete_name(athlete: &Value) -> Option<String> {
    ["fullName", "displayName"]
        .iter()
        .find_map(|k| athlete.get(*k).and_then(as_string))
        .filter(|s| !s.is_empty())
}

fn walk<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |cur, key| cur.get(*key))
}

fn as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    v.filter(|v| v.is_finite())
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `MIN` is either a number or `"mm:ss"`.
fn parse_minutes(value: &Value) -> Option<f64> {
    if let Some(s) = value.as_str()
        && let Some((m, sec)) = s.split_once(':')
    {
        let m: f64 = m.trim().parse().ok()?;
        let sec: f64 = sec.trim().parse().ok()?;
        return Some(m + sec / 60.0);
    }
    as_f64(value)
}

/// `StatsSource` over a directory of payloads saved from earlier fetches.
///
/// ```text
/// players.json
/// players/<id>/dashboard_<base|advanced>_<regular|playoffs>.json
/// players/<id>/gamelog_<regular|playoffs>.json
/// hustle_<regular|playoffs>.json
/// teams/<ABBR>/roster.json
/// teams/<ABBR>/injuries.json
/// ```
#[derive(Debug, Clone)]
pub struct PayloadDirSource {
    root: PathBuf,
    players: Vec<PlayerIndexEntry>,
    identities: IdentityMap,
}

impl PayloadDirSource {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let path = root.join("players.json");
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read player index {}", path.display()))?;
        let players = parse_player_index_json(&raw)
            .with_context(|| format!("decode player index {}", path.display()))?;
        let mut identities = IdentityMap::default();
        for p in &players {
            identities.insert(&p.full_name(), p.id);
        }
        debug!(root = %root.display(), players = players.len(), "payload dir opened");
        Ok(Self {
            root,
            players,
            identities,
        })
    }

    pub fn identities(&self) -> &IdentityMap {
        &self.identities
    }

    pub fn players(&self) -> &[PlayerIndexEntry] {
        &self.players
    }

    fn player_file(&self, id: PlayerId, name: &str) -> PathBuf {
        self.root.join("players").join(id.to_string()).join(name)
    }

    fn team_file(&self, team: &str, name: &str) -> PathBuf {
        self.root
            .join("teams")
            .join(team.trim().to_ascii_uppercase())
            .join(name)
    }

    /// Missing file is `None`; unreadable or undecodable files warn and read as `None`.
    fn load<T, F>(&self, path: &Path, decode: F) -> Option<T>
    where
        F: FnOnce(&str) -> std::result::Result<T, PropError>,
    {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), %err, "payload unreadable");
                return None;
            }
        };
        match decode(&raw) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(path = %path.display(), %err, "payload malformed");
                None
            }
        }
    }
}

impl StatsSource for PayloadDirSource {
    fn season_aggregate(
        &self,
        id: PlayerId,
        measure: MeasureType,
        season: SeasonType,
    ) -> Option<SeasonAggregate> {
        let file = format!("dashboard_{}_{}.json", measure.file_key(), season.file_key());
        self.load(&self.player_file(id, &file), |raw| {
            parse_dashboard_json(raw, id, season)
        })
        .flatten()
    }

    fn hustle_aggregate(&self, id: PlayerId, season: SeasonType) -> Option<HustleAggregate> {
        let path = self.root.join(format!("hustle_{}.json", season.file_key()));
        self.load(&path, |raw| parse_hustle_json(raw, id, season))
            .flatten()
    }

    fn recent_games(&self, id: PlayerId, season: SeasonType, count: usize) -> Vec<GameStatLine> {
        let file = format!("gamelog_{}.json", season.file_key());
        self.load(&self.player_file(id, &file), |raw| {
            parse_game_log_json(raw, count)
        })
        .unwrap_or_default()
    }

    fn roster(&self, team: &str) -> Vec<RosterEntry> {
        self.load(&self.team_file(team, "roster.json"), parse_espn_roster_json)
            .unwrap_or_default()
    }

    fn injuries(&self, team: &str) -> Vec<String> {
        self.load(&self.team_file(team, "injuries.json"), parse_espn_injuries_json)
            .unwrap_or_default()
    }
}
