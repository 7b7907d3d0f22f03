use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::PropError;
use crate::model::{
    GameStatLine, HustleAggregate, MeasureType, PlayerId, RosterEntry, SeasonAggregate, SeasonType,
};
use crate::source::{IdentityMap, StatsSource, normalize_name};

/// Games shown per season when the caller does not say otherwise.
pub const DEFAULT_PROFILE_GAMES: usize = 5;

/// Everything the source knows about one player for one season type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonProfile {
    pub season_type: SeasonType,
    pub base: Option<SeasonAggregate>,
    pub advanced: Option<SeasonAggregate>,
    pub hustle: Option<HustleAggregate>,
    pub games: Vec<GameStatLine>,
}

impl SeasonProfile {
    pub fn collect<S>(source: &S, id: PlayerId, season: SeasonType, games: usize) -> Self
    where
        S: StatsSource + ?Sized,
    {
        Self {
            season_type: season,
            base: source.season_aggregate(id, MeasureType::Base, season),
            advanced: source.season_aggregate(id, MeasureType::Advanced, season),
            hustle: source.hustle_aggregate(id, season),
            games: source.recent_games(id, season, games),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_none() && self.advanced.is_none() && self.hustle.is_none() && self.games.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterLine {
    pub name: String,
    pub position: String,
    pub inactive: bool,
}

/// Roster names flagged against the team's injury list.
pub fn roster_status(roster: &[RosterEntry], injured: &[String]) -> Vec<RosterLine> {
    let out: Vec<String> = injured.iter().map(|n| normalize_name(n)).collect();
    roster
        .iter()
        .map(|e| RosterLine {
            name: e.name.clone(),
            position: e.position.clone(),
            inactive: out.contains(&normalize_name(&e.name)),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRoster {
    pub team: String,
    pub players: Vec<RosterLine>,
}

/// Plain-text stat profile: regular season, playoffs and optionally the team roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub name: String,
    pub id: PlayerId,
    pub regular: SeasonProfile,
    pub playoffs: SeasonProfile,
    pub roster: Option<TeamRoster>,
}

pub fn build_profile<S>(
    source: &S,
    identities: &IdentityMap,
    player: &str,
    team: Option<&str>,
    games: usize,
) -> Result<PlayerProfile, PropError>
where
    S: StatsSource + ?Sized,
{
    let id = identities
        .resolve(player)
        .ok_or_else(|| PropError::PlayerNotFound(player.to_string()))?;
    let regular = SeasonProfile::collect(source, id, SeasonType::RegularSeason, games);
    let playoffs = SeasonProfile::collect(source, id, SeasonType::Playoffs, games);
    let roster = team.map(|team| {
        let team = team.trim().to_ascii_uppercase();
        let players = roster_status(&source.roster(&team), &source.injuries(&team));
        TeamRoster { team, players }
    });
    debug!(
        player,
        id,
        regular_games = regular.games.len(),
        playoff_games = playoffs.games.len(),
        "profile built"
    );
    Ok(PlayerProfile {
        name: player.trim().to_string(),
        id,
        regular,
        playoffs,
        roster,
    })
}

fn num(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
}

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn field(f: &mut fmt::Formatter<'_>, label: &str, value: String) -> fmt::Result {
    writeln!(f, "    {:<16} {}", format!("{label}:"), value)
}

impl fmt::Display for SeasonProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.season_type.label())?;
        if self.is_empty() {
            return writeln!(f, "  no data");
        }
        if let Some(b) = &self.base {
            writeln!(f, "  Traditional:")?;
            field(f, "GP", b.games_played.map_or_else(|| "N/A".into(), |v| format!("{v:.0}")))?;
            field(f, "MIN", num(b.minutes))?;
            field(f, "PTS", num(b.points))?;
            field(f, "REB", num(b.rebounds))?;
            field(f, "AST", num(b.assists))?;
            field(f, "FG%", pct(b.fg_pct))?;
            field(f, "3P%", pct(b.fg3_pct))?;
            field(f, "FT%", pct(b.ft_pct))?;
            field(f, "STL", num(b.steals))?;
            field(f, "BLK", num(b.blocks))?;
            field(f, "TOV", num(b.turnovers))?;
        }
        if let Some(a) = &self.advanced {
            writeln!(f, "  Advanced:")?;
            field(f, "OFF_RTG", num(a.off_rating))?;
            field(f, "DEF_RTG", num(a.def_rating))?;
            field(f, "NET_RTG", num(a.net_rating))?;
            field(f, "TS%", pct(a.ts_pct))?;
            field(f, "eFG%", pct(a.efg_pct))?;
            field(f, "AST%", pct(a.ast_pct))?;
            field(f, "OREB%", pct(a.oreb_pct))?;
            field(f, "DREB%", pct(a.dreb_pct))?;
            field(f, "REB%", pct(a.reb_pct))?;
            field(f, "USG%", pct(a.usage_pct))?;
            field(f, "PACE", num(a.pace))?;
            field(f, "PIE", pct(a.pie))?;
        }
        if let Some(h) = &self.hustle {
            writeln!(f, "  Hustle:")?;
            field(f, "CONTESTED_SHOTS", format!("{:.1}", h.contested_shots))?;
            field(f, "DEFLECTIONS", format!("{:.1}", h.deflections))?;
            field(f, "CHARGES_DRAWN", format!("{:.1}", h.charges_drawn))?;
            field(f, "SCREEN_ASTS", format!("{:.1}", h.screen_assists))?;
            field(f, "LOOSE_BALLS_REC", format!("{:.1}", h.loose_balls_recovered))?;
            field(f, "BOXOUTS", format!("{:.1}", h.box_outs()))?;
        }
        if !self.games.is_empty() {
            writeln!(f, "  Recent games (last {}):", self.games.len())?;
            writeln!(
                f,
                "    {:<12} {:<12} {:>5} {:>4} {:>4} {:>4} {:>6} {:>6} {:>6} {:>6} {:>6}",
                "DATE", "MATCHUP", "MIN", "PTS", "REB", "AST", "FG%", "3P%", "FT%", "TS%", "eFG%"
            )?;
            for g in &self.games {
                let s = &g.shooting;
                writeln!(
                    f,
                    "    {:<12} {:<12} {:>5.1} {:>4.0} {:>4.0} {:>4.0} {:>6} {:>6} {:>6} {:>6} {:>6}",
                    g.game_date,
                    g.matchup,
                    g.minutes,
                    g.stats.pts,
                    g.stats.reb,
                    g.stats.ast,
                    pct(Some(s.fg_pct)),
                    pct(Some(s.fg3_pct)),
                    pct(Some(s.ft_pct)),
                    pct(Some(s.ts_pct)),
                    pct(Some(s.efg_pct)),
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TeamRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Roster ({}):", self.team)?;
        for p in &self.players {
            let suffix = if p.inactive { " (Inactive)" } else { "" };
            writeln!(f, "  - {}{}", p.name, suffix)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player: {} ({})", self.name, self.id)?;
        write!(f, "{}", self.regular)?;
        // playoffs only when the player has any
        if !self.playoffs.is_empty() {
            write!(f, "{}", self.playoffs)?;
        }
        if let Some(roster) = &self.roster {
            write!(f, "{roster}")?;
        }
        Ok(())
    }
}
