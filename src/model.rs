use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PropError;

pub type PlayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeasonType {
    #[default]
    RegularSeason,
    Playoffs,
}

impl SeasonType {
    pub fn label(self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
        }
    }

    pub fn file_key(self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "regular",
            SeasonType::Playoffs => "playoffs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    Base,
    Advanced,
}

impl MeasureType {
    pub fn file_key(self) -> &'static str {
        match self {
            MeasureType::Base => "base",
            MeasureType::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Over => "Over",
            Direction::Under => "Under",
        }
    }

    /// Strict comparison: a value sitting exactly on the line satisfies neither side.
    pub fn is_satisfied_by(self, value: f64, line: f64) -> bool {
        match self {
            Direction::Over => value > line,
            Direction::Under => value < line,
        }
    }
}

impl FromStr for Direction {
    type Err = PropError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "o" | "over" => Ok(Direction::Over),
            "u" | "under" => Ok(Direction::Under),
            _ => Err(PropError::InvalidDirection(raw.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Points,
    Rebounds,
    Assists,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::Points, StatKind::Rebounds, StatKind::Assists];

    pub fn letter(self) -> char {
        match self {
            StatKind::Points => 'P',
            StatKind::Rebounds => 'R',
            StatKind::Assists => 'A',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(StatKind::Points),
            'R' => Some(StatKind::Rebounds),
            'A' => Some(StatKind::Assists),
            _ => None,
        }
    }
}

/// Which counting stats are summed into the quantity under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatSelection {
    points: bool,
    rebounds: bool,
    assists: bool,
}

impl StatSelection {
    pub const PRA: StatSelection = StatSelection {
        points: true,
        rebounds: true,
        assists: true,
    };

    pub fn from_kinds<I>(kinds: I) -> Option<Self>
    where
        I: IntoIterator<Item = StatKind>,
    {
        let mut out = StatSelection {
            points: false,
            rebounds: false,
            assists: false,
        };
        for kind in kinds {
            match kind {
                StatKind::Points => out.points = true,
                StatKind::Rebounds => out.rebounds = true,
                StatKind::Assists => out.assists = true,
            }
        }
        if out.is_empty() { None } else { Some(out) }
    }

    pub fn contains(&self, kind: StatKind) -> bool {
        match kind {
            StatKind::Points => self.points,
            StatKind::Rebounds => self.rebounds,
            StatKind::Assists => self.assists,
        }
    }

    fn is_empty(&self) -> bool {
        !(self.points || self.rebounds || self.assists)
    }

    pub fn kinds(&self) -> impl Iterator<Item = StatKind> + '_ {
        StatKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Canonical label, always in P-R-A order.
    pub fn label(&self) -> String {
        self.kinds().map(StatKind::letter).collect()
    }

    pub fn game_total(&self, game: &GameStatLine) -> f64 {
        self.kinds().map(|k| game.stats.value(k)).sum()
    }

    pub fn season_total(&self, season: &SeasonAggregate) -> f64 {
        self.kinds().map(|k| season.average(k)).sum()
    }
}

impl FromStr for StatSelection {
    type Err = PropError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let mut kinds = Vec::with_capacity(3);
        for c in trimmed.chars() {
            match StatKind::from_letter(c) {
                Some(kind) => kinds.push(kind),
                None => return Err(PropError::InvalidStatSelection(raw.to_string())),
            }
        }
        Self::from_kinds(kinds).ok_or_else(|| PropError::InvalidStatSelection(raw.to_string()))
    }
}

impl TryFrom<String> for StatSelection {
    type Error = PropError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<StatSelection> for String {
    fn from(sel: StatSelection) -> Self {
        sel.label()
    }
}

impl fmt::Display for StatSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Inclusive integer range of candidate lines for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineRange")]
pub struct LineRange {
    min: i32,
    max: i32,
}

#[derive(Deserialize)]
struct RawLineRange {
    min: i32,
    max: i32,
}

impl TryFrom<RawLineRange> for LineRange {
    type Error = PropError;

    fn try_from(raw: RawLineRange) -> Result<Self, Self::Error> {
        LineRange::new(raw.min, raw.max)
    }
}

impl LineRange {
    pub fn new(min: i32, max: i32) -> Result<Self, PropError> {
        if min > max {
            return Err(PropError::InvalidLineRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn len(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1) as usize
    }

    pub fn lines(&self) -> impl Iterator<Item = f64> {
        (self.min..=self.max).map(f64::from)
    }
}

impl FromStr for LineRange {
    type Err = PropError;

    /// Accepts `MIN:MAX` or `MIN..MAX` (both inclusive).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PropError::InvalidLineRange { min: 0, max: -1 };
        let (lo, hi) = raw
            .split_once("..")
            .or_else(|| raw.split_once(':'))
            .ok_or_else(invalid)?;
        let lo = lo.trim().parse::<i32>().map_err(|_| invalid())?;
        let hi = hi.trim().trim_start_matches('=').parse::<i32>().map_err(|_| invalid())?;
        LineRange::new(lo, hi)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxScore {
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub pf: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub ftm: f64,
    pub fta: f64,
}

impl BoxScore {
    pub fn value(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Points => self.pts,
            StatKind::Rebounds => self.reb,
            StatKind::Assists => self.ast,
        }
    }
}

/// Shooting percentages derived from a box score, as fractions (0.0-1.0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShootingSplits {
    pub fg_pct: f64,
    pub fg3_pct: f64,
    pub ft_pct: f64,
    pub ts_pct: f64,
    pub efg_pct: f64,
}

impl ShootingSplits {
    pub fn from_box(b: &BoxScore) -> Self {
        let ts_attempts = b.fga + 0.44 * b.fta;
        Self {
            fg_pct: ratio(b.fgm, b.fga),
            fg3_pct: ratio(b.fg3m, b.fg3a),
            ft_pct: ratio(b.ftm, b.fta),
            ts_pct: ratio(b.pts, 2.0 * ts_attempts),
            efg_pct: ratio(b.fgm + 0.5 * b.fg3m, b.fga),
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// One played game for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGameLine")]
pub struct GameStatLine {
    pub game_date: String,
    pub matchup: String,
    pub minutes: f64,
    pub stats: BoxScore,
    pub shooting: ShootingSplits,
}

#[derive(Deserialize)]
struct RawGameLine {
    #[serde(default)]
    game_date: String,
    #[serde(default)]
    matchup: String,
    #[serde(default)]
    minutes: f64,
    #[serde(default)]
    stats: BoxScore,
}

impl From<RawGameLine> for GameStatLine {
    fn from(raw: RawGameLine) -> Self {
        GameStatLine::new(raw.game_date, raw.matchup, raw.minutes, raw.stats)
    }
}

impl GameStatLine {
    pub fn new(
        game_date: impl Into<String>,
        matchup: impl Into<String>,
        minutes: f64,
        stats: BoxScore,
    ) -> Self {
        let shooting = ShootingSplits::from_box(&stats);
        Self {
            game_date: game_date.into(),
            matchup: matchup.into(),
            minutes,
            stats,
            shooting,
        }
    }

    /// Matchup strings look like `"GSW vs. LAL"` or `"GSW @ LAL"`; the opponent follows a space.
    pub fn played_against(&self, opponent: &str) -> bool {
        let opp = opponent.trim().to_ascii_uppercase();
        if opp.is_empty() {
            return false;
        }
        self.matchup
            .to_ascii_uppercase()
            .contains(&format!(" {opp}"))
    }
}

/// A player's season summary for one season type.
///
/// Base and Advanced dashboards arrive separately and are merged; every field is optional because
/// either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonAggregate {
    pub player_id: Option<PlayerId>,
    pub season_type: SeasonType,

    pub games_played: Option<f64>,
    pub minutes: Option<f64>,
    pub points: Option<f64>,
    pub rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
    pub fg_pct: Option<f64>,
    pub fg3_pct: Option<f64>,
    pub ft_pct: Option<f64>,

    pub off_rating: Option<f64>,
    pub def_rating: Option<f64>,
    pub net_rating: Option<f64>,
    pub pace: Option<f64>,
    pub usage_pct: Option<f64>,
    pub ts_pct: Option<f64>,
    pub efg_pct: Option<f64>,
    pub ast_pct: Option<f64>,
    pub oreb_pct: Option<f64>,
    pub dreb_pct: Option<f64>,
    pub reb_pct: Option<f64>,
    pub pie: Option<f64>,
}

impl SeasonAggregate {
    pub fn empty(season_type: SeasonType) -> Self {
        Self {
            season_type,
            ..Default::default()
        }
    }

    /// Per-game average for one counting stat; absent reads as zero.
    pub fn average(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Points => self.points,
            StatKind::Rebounds => self.rebounds,
            StatKind::Assists => self.assists,
        }
        .unwrap_or(0.0)
    }

    /// Field-wise merge; values already present on `self` win.
    pub fn merge(self, other: SeasonAggregate) -> SeasonAggregate {
        SeasonAggregate {
            player_id: self.player_id.or(other.player_id),
            season_type: self.season_type,
            games_played: self.games_played.or(other.games_played),
            minutes: self.minutes.or(other.minutes),
            points: self.points.or(other.points),
            rebounds: self.rebounds.or(other.rebounds),
            assists: self.assists.or(other.assists),
            steals: self.steals.or(other.steals),
            blocks: self.blocks.or(other.blocks),
            turnovers: self.turnovers.or(other.turnovers),
            fg_pct: self.fg_pct.or(other.fg_pct),
            fg3_pct: self.fg3_pct.or(other.fg3_pct),
            ft_pct: self.ft_pct.or(other.ft_pct),
            off_rating: self.off_rating.or(other.off_rating),
            def_rating: self.def_rating.or(other.def_rating),
            net_rating: self.net_rating.or(other.net_rating),
            pace: self.pace.or(other.pace),
            usage_pct: self.usage_pct.or(other.usage_pct),
            ts_pct: self.ts_pct.or(other.ts_pct),
            efg_pct: self.efg_pct.or(other.efg_pct),
            ast_pct: self.ast_pct.or(other.ast_pct),
            oreb_pct: self.oreb_pct.or(other.oreb_pct),
            dreb_pct: self.dreb_pct.or(other.dreb_pct),
            reb_pct: self.reb_pct.or(other.reb_pct),
            pie: self.pie.or(other.pie),
        }
    }
}

/// Secondary effort metrics. Shown next to a prediction, never fed into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HustleAggregate {
    pub player_id: Option<PlayerId>,
    pub season_type: SeasonType,
    pub contested_shots: f64,
    pub deflections: f64,
    pub charges_drawn: f64,
    pub screen_assists: f64,
    pub loose_balls_recovered: f64,
    pub off_boxouts: f64,
    pub def_boxouts: f64,
}

impl HustleAggregate {
    pub fn box_outs(&self) -> f64 {
        self.off_boxouts + self.def_boxouts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    OffensiveRating,
    Pace,
    Defense,
    InjuryUsage,
    Rest,
    HomeCourt,
}

impl FactorKind {
    pub fn label(self) -> &'static str {
        match self {
            FactorKind::OffensiveRating => "Off. Rating factor",
            FactorKind::Pace => "Pace factor",
            FactorKind::Defense => "Defender factor",
            FactorKind::InjuryUsage => "Injury usage multiplier",
            FactorKind::Rest => "Rest multiplier",
            FactorKind::HomeCourt => "Home-court multiplier",
        }
    }
}

/// One multiplicative adjustment, kept for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub kind: FactorKind,
    pub value: f64,
}
