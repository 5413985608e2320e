use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Schema/logic version of persisted team records. Bumping it forces a full
/// recompute of every record on next lookup; there is no in-place migration.
pub const CURRENT_VERSION: u32 = 7;

/// Schema version of persisted per-event ranking snapshots.
pub const EVENT_VERSION: u32 = 2;

/// Marker meaning "luck score not yet computed", distinct from any real value.
pub const LUCK_SENTINEL: &str = "-999";

pub const DEFAULT_INSIGHT: &str = "No insights available.";

/// Competition season the whole pipeline is pinned to.
pub const DEFAULT_SEASON_YEAR: u32 = 2024;

/// Cached team record, keyed by team number in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub number: u32,
    pub name: String,
    pub version: u32,
    /// Index 0 is the current season.
    pub seasons: Vec<Season>,
}

impl Team {
    pub fn new(number: u32, name: String, season: Season) -> Self {
        Self {
            number,
            name,
            version: CURRENT_VERSION,
            seasons: vec![season],
        }
    }

    pub fn current_season(&self) -> Option<&Season> {
        self.seasons.first()
    }

    pub fn current_season_mut(&mut self) -> Option<&mut Season> {
        self.seasons.first_mut()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub year: String,
    pub win: u32,
    pub loss: u32,
    pub ties: u32,
    /// Rendered with one decimal place; "0" when no games played.
    pub avg_points: String,
    /// Rendered with two decimal places; LUCK_SENTINEL until the extension
    /// pass has run.
    pub luck_score: String,
    pub ai_insight: String,
    /// Per-match derived specimen point totals, one entry per qualification
    /// match with score detail available.
    pub specimens: Vec<i64>,
    pub samples: Vec<i64>,
    /// Chronological points series across all events; matchNumber is a
    /// synthetic 1-based counter, not the match's own number.
    pub points: Vec<PointEntry>,
    pub rookie_year: String,
    pub location: String,
    pub sponsors: Vec<String>,
    pub quick_stats: QuickStats,
    pub role_prediction: RolePrediction,
    /// Most-recent-first for display; assembled oldest-to-newest internally.
    pub events: Vec<SeasonEvent>,
}

impl Default for Season {
    fn default() -> Self {
        Self {
            year: DEFAULT_SEASON_YEAR.to_string(),
            win: 0,
            loss: 0,
            ties: 0,
            avg_points: "0".to_string(),
            luck_score: LUCK_SENTINEL.to_string(),
            ai_insight: DEFAULT_INSIGHT.to_string(),
            specimens: Vec::new(),
            samples: Vec::new(),
            points: Vec::new(),
            rookie_year: "0".to_string(),
            location: "0".to_string(),
            sponsors: Vec::new(),
            quick_stats: QuickStats::default(),
            role_prediction: RolePrediction::default(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    pub match_number: u32,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonEvent {
    pub name: String,
    /// Display strings ("November 16, 2024"), "Unknown" when unparsable.
    pub date_start: String,
    pub date_end: String,
    /// Qualification placement; -1 when rankings were unavailable or the
    /// team is absent from them.
    pub rank: i32,
    /// Field size (number of ranked teams).
    pub teams: u32,
    pub quals: Vec<MatchRecord>,
    pub playoffs: Vec<MatchRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub fn label(self) -> &'static str {
        match self {
            Alliance::Red => "Red",
            Alliance::Blue => "Blue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(rename = "match")]
    pub match_number: u32,
    /// This team's alliance total in the match.
    pub points: i64,
    pub alliance: Alliance,
    pub red_score: i64,
    pub blue_score: i64,
    pub red_teams: Vec<TeamRef>,
    pub blue_teams: Vec<TeamRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub name: String,
    pub number: u32,
}

/// OPR-style ranked metrics supplied pre-computed by the quick-stats API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStats {
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub auto: StatRank,
    #[serde(default)]
    pub dc: StatRank,
    #[serde(default)]
    pub eg: StatRank,
    #[serde(default)]
    pub tot: StatRank,
    /// Size of the ranking pool.
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatRank {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub rank: u32,
}

/// Scoring-specialty split; the two percentages sum to 100 within rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePrediction {
    pub percent_samples: String,
    pub percent_specimens: String,
}

impl Default for RolePrediction {
    fn default() -> Self {
        Self {
            percent_samples: "0".to_string(),
            percent_specimens: "0".to_string(),
        }
    }
}

/// Per-event ranking snapshot shared across every team that competed in the
/// event, keyed by event code in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRanking {
    pub event_code: String,
    pub version: u32,
    pub rankings: Vec<RankingRow>,
}

impl EventRanking {
    pub fn rank_of(&self, team_number: u32) -> i32 {
        self.rankings
            .iter()
            .find(|row| row.team_number == team_number)
            .map(|row| row.rank as i32)
            .unwrap_or(-1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub team_number: u32,
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub rp: f64,
    pub tbp: f64,
    pub ascent: f64,
    pub high_score: f64,
    pub matches_played: u32,
}

pub type TeamMap = HashMap<u32, String>;

pub fn team_name(team_map: &TeamMap, number: u32) -> String {
    team_map
        .get(&number)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}
