use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};

use crate::events_api::{
    EventListing, OfficialEvents, RawMatch, RawMatchScore, RawMatchTeam, RawRankingRow,
    TeamProfile, TournamentLevel, score_map,
};
use crate::insight::InsightGenerator;
use crate::model::{QuickStats, StatRank, TeamRef};
use crate::scout_api::{
    GraphMatch, GraphMatchEntry, GraphParticipant, GraphQuickStats, GraphStatValue, GraphTeam,
    MatchGraphSource, QuickStatsSource, TeamDirectorySource, TeamGraph,
};

/// Which adapter calls should fail, for exercising partial-failure paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeFailures {
    pub profile: bool,
    pub events: bool,
    pub matches: bool,
    pub rankings: bool,
    pub scores: bool,
    pub quick_stats: bool,
    pub graph: bool,
    pub insight: bool,
}

/// In-process implementation of every upstream adapter, with canned data
/// and per-endpoint call counters. Used by the test suite and by the
/// offline demo mode (`FTC_FAKE=1`).
#[derive(Default)]
pub struct FakeSource {
    pub profile: Option<TeamProfile>,
    pub events: Vec<EventListing>,
    pub matches: HashMap<String, Vec<RawMatch>>,
    pub rankings: HashMap<String, Vec<RawRankingRow>>,
    pub scores: HashMap<String, Vec<RawMatchScore>>,
    pub quick_stats: Option<QuickStats>,
    pub graph: Option<TeamGraph>,
    pub insight_text: String,
    pub directory: Vec<TeamRef>,
    pub fail: FakeFailures,

    ranking_fetches: AtomicUsize,
    match_fetches: AtomicUsize,
    score_fetches: AtomicUsize,
    profile_fetches: AtomicUsize,
    event_list_fetches: AtomicUsize,
    quick_stats_fetches: AtomicUsize,
    graph_fetches: AtomicUsize,
    insight_calls: AtomicUsize,
    directory_fetches: AtomicUsize,
}

pub const FAKE_TEAM: u32 = 9876;

impl FakeSource {
    /// Two-event demo season for team 9876 "Voltage Vipers": five quals
    /// and a playoff across the events, score detail missing for one
    /// qualification match, one tie.
    pub fn seeded() -> Self {
        let mut source = Self {
            profile: Some(TeamProfile {
                city: "Brooklyn".to_string(),
                state_prov: "NY".to_string(),
                country: "USA".to_string(),
                rookie_year: Some(2019),
                sponsors: vec!["Brooklyn STEM Fund".to_string()],
            }),
            insight_text: "$STRENGTH: <li>Consistent teleop cycles</li> \
                           $WEAKNESS: <li>Slow autonomous</li> $SCORE: 7.5"
                .to_string(),
            quick_stats: Some(QuickStats {
                season: 2024,
                number: FAKE_TEAM,
                auto: StatRank { value: 31.2, rank: 412 },
                dc: StatRank { value: 58.4, rank: 257 },
                eg: StatRank { value: 12.1, rank: 601 },
                tot: StatRank { value: 101.7, rank: 305 },
                count: 7641,
            }),
            ..Self::default()
        };

        source.events = vec![
            listing("USNYBRQ2", "Brooklyn Qualifier 2", "2025-01-11T00:00:00"),
            listing("USNYBRQ1", "Brooklyn Qualifier 1", "2024-11-16T00:00:00"),
        ];

        source.directory = vec![
            TeamRef { name: "Voltage Vipers".to_string(), number: FAKE_TEAM },
            TeamRef { name: "Gear Gremlins".to_string(), number: 1111 },
            TeamRef { name: "Null Pointers".to_string(), number: 2222 },
            TeamRef { name: "Torque Titans".to_string(), number: 3333 },
            TeamRef { name: "Servo Sharks".to_string(), number: 4444 },
        ];

        source.matches.insert(
            "USNYBRQ1".to_string(),
            vec![
                qual(1, [FAKE_TEAM, 1111], [3333, 4444], 78, 64),
                qual(2, [2222, 3333], [FAKE_TEAM, 4444], 50, 50),
                qual(3, [FAKE_TEAM, 2222], [1111, 3333], 41, 66),
            ],
        );
        source.matches.insert(
            "USNYBRQ2".to_string(),
            vec![
                qual(1, [FAKE_TEAM, 4444], [1111, 2222], 83, 47),
                qual(2, [3333, FAKE_TEAM], [2222, 1111], 92, 55),
                playoff(1, [FAKE_TEAM, 3333], [1111, 4444], 101, 96),
            ],
        );

        source.rankings.insert(
            "USNYBRQ1".to_string(),
            vec![
                ranking_row(1, 3333, 2, 1, 0),
                ranking_row(2, FAKE_TEAM, 1, 1, 1),
                ranking_row(3, 1111, 1, 2, 0),
                ranking_row(4, 2222, 1, 2, 1),
                ranking_row(5, 4444, 0, 2, 1),
            ],
        );
        source.rankings.insert(
            "USNYBRQ2".to_string(),
            vec![
                ranking_row(1, FAKE_TEAM, 2, 0, 0),
                ranking_row(2, 3333, 1, 1, 0),
                ranking_row(3, 1111, 1, 1, 0),
                ranking_row(4, 2222, 0, 2, 0),
            ],
        );

        // Score detail for qual 3 of the first event is missing.
        source.scores.insert(
            "USNYBRQ1".to_string(),
            vec![
                alliance_scores(1, (4, 3, 2), (1, 2, 1)),
                alliance_scores(2, (2, 1, 1), (3, 2, 2)),
            ],
        );
        source.scores.insert(
            "USNYBRQ2".to_string(),
            vec![
                alliance_scores(1, (5, 3, 3), (2, 1, 1)),
                alliance_scores(2, (1, 1, 0), (6, 4, 2)),
            ],
        );

        source.graph = Some(seeded_graph());
        source
    }

    pub fn ranking_fetches(&self) -> usize {
        self.ranking_fetches.load(Ordering::SeqCst)
    }

    pub fn match_fetches(&self) -> usize {
        self.match_fetches.load(Ordering::SeqCst)
    }

    pub fn score_fetches(&self) -> usize {
        self.score_fetches.load(Ordering::SeqCst)
    }

    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    pub fn event_list_fetches(&self) -> usize {
        self.event_list_fetches.load(Ordering::SeqCst)
    }

    pub fn quick_stats_fetches(&self) -> usize {
        self.quick_stats_fetches.load(Ordering::SeqCst)
    }

    pub fn graph_fetches(&self) -> usize {
        self.graph_fetches.load(Ordering::SeqCst)
    }

    pub fn insight_calls(&self) -> usize {
        self.insight_calls.load(Ordering::SeqCst)
    }

    pub fn directory_fetches(&self) -> usize {
        self.directory_fetches.load(Ordering::SeqCst)
    }

    pub fn total_adapter_calls(&self) -> usize {
        self.ranking_fetches()
            + self.match_fetches()
            + self.score_fetches()
            + self.profile_fetches()
            + self.event_list_fetches()
            + self.quick_stats_fetches()
            + self.graph_fetches()
            + self.insight_calls()
    }
}

impl OfficialEvents for FakeSource {
    fn team_profile(&self, _team_number: u32) -> Result<Option<TeamProfile>> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.profile {
            return Err(anyhow!("fake profile outage"));
        }
        Ok(self.profile.clone())
    }

    fn team_events(&self, _team_number: u32) -> Result<Vec<EventListing>> {
        self.event_list_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.events {
            return Err(anyhow!("fake event list outage"));
        }
        Ok(self.events.clone())
    }

    fn event_matches(&self, event_code: &str) -> Result<Vec<RawMatch>> {
        self.match_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.matches {
            return Err(anyhow!("fake match outage"));
        }
        Ok(self.matches.get(event_code).cloned().unwrap_or_default())
    }

    fn event_rankings(&self, event_code: &str) -> Result<Vec<RawRankingRow>> {
        self.ranking_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.rankings {
            return Err(anyhow!("fake ranking outage"));
        }
        Ok(self.rankings.get(event_code).cloned().unwrap_or_default())
    }

    fn score_details(
        &self,
        event_code: &str,
        _level: TournamentLevel,
    ) -> Result<HashMap<u32, RawMatchScore>> {
        self.score_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.scores {
            return Err(anyhow!("fake score detail outage"));
        }
        Ok(score_map(
            self.scores.get(event_code).cloned().unwrap_or_default(),
        ))
    }
}

impl QuickStatsSource for FakeSource {
    fn quick_stats(&self, _team_number: u32) -> Result<Option<QuickStats>> {
        self.quick_stats_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.quick_stats {
            return Err(anyhow!("fake quick-stats outage"));
        }
        Ok(self.quick_stats.clone())
    }
}

impl MatchGraphSource for FakeSource {
    fn match_graph(&self, _team_number: u32) -> Result<Option<TeamGraph>> {
        self.graph_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.graph {
            return Err(anyhow!("fake graph outage"));
        }
        Ok(self.graph.clone())
    }
}

impl InsightGenerator for FakeSource {
    fn generate(&self, _team: &crate::model::Team) -> Result<String> {
        self.insight_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.insight {
            return Err(anyhow!("fake insight outage"));
        }
        Ok(self.insight_text.clone())
    }
}

impl TeamDirectorySource for FakeSource {
    fn team_search(&self) -> Result<Vec<TeamRef>> {
        self.directory_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.directory.clone())
    }
}

fn listing(code: &str, name: &str, start: &str) -> EventListing {
    EventListing {
        code: code.to_string(),
        name: name.to_string(),
        date_start: start.to_string(),
        date_end: start.to_string(),
    }
}

pub fn qual(
    match_number: u32,
    red: [u32; 2],
    blue: [u32; 2],
    red_score: i64,
    blue_score: i64,
) -> RawMatch {
    raw_match(match_number, "QUALIFICATION", red, blue, red_score, blue_score)
}

pub fn playoff(
    match_number: u32,
    red: [u32; 2],
    blue: [u32; 2],
    red_score: i64,
    blue_score: i64,
) -> RawMatch {
    raw_match(match_number, "PLAYOFF", red, blue, red_score, blue_score)
}

fn raw_match(
    match_number: u32,
    level: &str,
    red: [u32; 2],
    blue: [u32; 2],
    red_score: i64,
    blue_score: i64,
) -> RawMatch {
    RawMatch {
        match_number,
        tournament_level: level.to_string(),
        score_red_final: red_score,
        score_blue_final: blue_score,
        teams: vec![
            station(red[0], "Red1"),
            station(red[1], "Red2"),
            station(blue[0], "Blue1"),
            station(blue[1], "Blue2"),
        ],
    }
}

fn station(team_number: u32, station: &str) -> RawMatchTeam {
    RawMatchTeam {
        team_number,
        station: station.to_string(),
    }
}

pub fn ranking_row(rank: u32, team_number: u32, wins: u32, losses: u32, ties: u32) -> RawRankingRow {
    RawRankingRow {
        rank,
        team_number,
        wins,
        losses,
        ties,
        sort_order1: (wins * 2 + ties) as f64,
        sort_order2: 20.0 + rank as f64,
        sort_order3: 10.0,
        sort_order4: 80.0 + wins as f64,
        matches_played: wins + losses + ties,
    }
}

/// Score detail for one match: (net, low, high) sample counts per side,
/// reused for the specimen chambers to keep the fixture small.
pub fn alliance_scores(
    match_number: u32,
    red: (i64, i64, i64),
    blue: (i64, i64, i64),
) -> RawMatchScore {
    RawMatchScore {
        match_number,
        alliances: vec![alliance_side("Red", red), alliance_side("Blue", blue)],
    }
}

fn alliance_side(alliance: &str, counts: (i64, i64, i64)) -> crate::events_api::RawAllianceScore {
    crate::events_api::RawAllianceScore {
        alliance: alliance.to_string(),
        teleop_sample_net: counts.0,
        teleop_sample_low: counts.1,
        teleop_sample_high: counts.2,
        teleop_specimen_low: counts.1,
        teleop_specimen_high: counts.2,
    }
}

fn seeded_graph() -> TeamGraph {
    TeamGraph {
        number: FAKE_TEAM,
        quick_stats: graph_stats(101.7),
        matches: vec![
            graph_match("Red", &[
                ("Red", FAKE_TEAM, Some(101.7)),
                ("Red", 1111, Some(74.0)),
                ("Blue", 3333, Some(88.0)),
                ("Blue", 4444, Some(52.0)),
            ]),
            graph_match("Blue", &[
                ("Red", 2222, Some(61.0)),
                ("Red", 3333, Some(88.0)),
                ("Blue", FAKE_TEAM, Some(101.7)),
                ("Blue", 4444, Some(52.0)),
            ]),
        ],
    }
}

pub fn graph_match(alliance: &str, teams: &[(&str, u32, Option<f64>)]) -> GraphMatchEntry {
    GraphMatchEntry {
        alliance: alliance.to_string(),
        detail: GraphMatch {
            tournament_level: "Quals".to_string(),
            teams: teams
                .iter()
                .map(|(side, number, opr)| GraphParticipant {
                    alliance: side.to_string(),
                    team: GraphTeam {
                        number: *number,
                        quick_stats: opr.and_then(graph_stats),
                    },
                })
                .collect(),
        },
    }
}

fn graph_stats(value: f64) -> Option<GraphQuickStats> {
    Some(GraphQuickStats {
        tot: GraphStatValue { value },
    })
}
