use std::collections::HashMap;
use std::env;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;

use crate::analysis;
use crate::event_cache::resolve_event_ranking;
use crate::events_api::{
    EventListing, OfficialEvents, RawMatch, RawMatchScore, TournamentLevel,
};
use crate::insight::InsightGenerator;
use crate::model::{
    Alliance, EVENT_VERSION, EventRanking, MatchRecord, PointEntry, Season, SeasonEvent, Team,
    TeamMap, TeamRef, team_name,
};
use crate::scout_api::{MatchGraphSource, QuickStatsSource, TeamGraph};
use crate::store::Store;

/// Output of the core reconciliation pass. Non-fatal upstream failures are
/// collected into `errors` and the affected fields keep their defaults;
/// `fatal` is set only when the event list itself could not be fetched and
/// the season is a best-effort stub.
pub struct CorePass {
    pub season: Season,
    pub errors: Vec<String>,
    pub fatal: Option<String>,
}

/// Builds the canonical season record for one team from the official events
/// API plus the quick-stats source. Per-event match and score-detail fetches
/// fan out in parallel; assembly is strictly chronological so the synthetic
/// match numbering in the points series reflects play order, not completion
/// order.
pub fn reconcile_core<O, Q>(
    store: &Store,
    official: &O,
    quick: &Q,
    team_number: u32,
    team_map: &TeamMap,
) -> CorePass
where
    O: OfficialEvents + Sync,
    Q: QuickStatsSource,
{
    let mut errors = Vec::new();
    let mut season = Season::default();
    season.rookie_year = "Not Found".to_string();
    season.location = "Unknown".to_string();

    match official.team_profile(team_number) {
        Ok(Some(profile)) => {
            season.location = profile.location();
            season.sponsors = profile.sponsors;
            if let Some(rookie_year) = profile.rookie_year {
                season.rookie_year = rookie_year.to_string();
            }
        }
        // Teams with no upstream presence are valid, just uninteresting.
        Ok(None) => {
            return CorePass {
                season,
                errors,
                fatal: None,
            };
        }
        Err(err) => errors.push(format!("team profile fetch failed: {err}")),
    }

    let mut events = match official.team_events(team_number) {
        Ok(events) => events,
        Err(err) => {
            let message = format!("event list fetch failed: {err}");
            errors.push(message.clone());
            return CorePass {
                season,
                errors,
                fatal: Some(message),
            };
        }
    };
    if events.is_empty() {
        return CorePass {
            season,
            errors,
            fatal: None,
        };
    }

    // Oldest first; upstream order is unspecified.
    events.sort_by(|a, b| {
        parse_event_date(&a.date_start)
            .cmp(&parse_event_date(&b.date_start))
            .then_with(|| a.code.cmp(&b.code))
    });

    let fetched = fetch_event_bundles(official, &events);

    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut ties = 0u32;
    let mut total_points = 0i64;
    let mut games_played = 0u32;
    let mut samples: Vec<i64> = Vec::new();
    let mut specimens: Vec<i64> = Vec::new();
    let mut points: Vec<PointEntry> = Vec::new();
    let mut processed_events: Vec<SeasonEvent> = Vec::new();

    for (listing, bundle) in events.iter().zip(fetched) {
        let ranking = match resolve_event_ranking(store, official, &listing.code) {
            Ok(ranking) => ranking,
            Err(err) => {
                errors.push(format!("{} rankings fetch failed: {err}", listing.code));
                EventRanking {
                    event_code: listing.code.clone(),
                    version: EVENT_VERSION,
                    rankings: Vec::new(),
                }
            }
        };

        let matches = match bundle.matches {
            Ok(matches) => matches,
            Err(err) => {
                errors.push(format!("{} matches fetch failed: {err}", listing.code));
                Vec::new()
            }
        };
        let scores = match bundle.scores {
            Ok(scores) => scores,
            Err(err) => {
                errors.push(format!("{} score details fetch failed: {err}", listing.code));
                HashMap::new()
            }
        };

        // A qualification match with no score detail contributes nothing
        // here but still counts toward the tallies below.
        for m in &matches {
            if !m.is_qualification() {
                continue;
            }
            let Some(score) = scores.get(&m.match_number) else {
                continue;
            };
            let Some(alliance) = m.alliance_of(team_number) else {
                continue;
            };
            let Some(side) = score.side(alliance) else {
                continue;
            };
            samples.push(side.sample_points());
            specimens.push(side.specimen_points());
        }

        let mut quals = Vec::new();
        let mut playoffs = Vec::new();
        for m in &matches {
            let Some(alliance) = m.alliance_of(team_number) else {
                continue;
            };
            games_played += 1;
            let red = m.score_red_final;
            let blue = m.score_blue_final;
            let own = match alliance {
                Alliance::Red => red,
                Alliance::Blue => blue,
            };
            let their = match alliance {
                Alliance::Red => blue,
                Alliance::Blue => red,
            };
            total_points += own;
            if red == blue {
                ties += 1;
            } else if own > their {
                wins += 1;
            } else {
                losses += 1;
            }

            let mut red_teams = Vec::new();
            let mut blue_teams = Vec::new();
            for entrant in &m.teams {
                let team_ref = TeamRef {
                    name: team_name(team_map, entrant.team_number),
                    number: entrant.team_number,
                };
                match entrant.alliance() {
                    Alliance::Red => red_teams.push(team_ref),
                    Alliance::Blue => blue_teams.push(team_ref),
                }
            }

            let record = MatchRecord {
                match_number: m.match_number,
                points: own,
                alliance,
                red_score: red,
                blue_score: blue,
                red_teams,
                blue_teams,
            };
            if m.is_qualification() {
                points.push(PointEntry {
                    match_number: points.len() as u32 + 1,
                    points: own,
                });
                quals.push(record);
            } else {
                playoffs.push(record);
            }
        }

        processed_events.push(SeasonEvent {
            name: listing.name.clone(),
            date_start: format_event_date(&listing.date_start),
            date_end: format_event_date(&listing.date_end),
            rank: ranking.rank_of(team_number),
            teams: ranking.rankings.len() as u32,
            quals,
            playoffs,
        });
    }

    match quick.quick_stats(team_number) {
        Ok(Some(stats)) => season.quick_stats = stats,
        Ok(None) => {}
        Err(err) => errors.push(format!("quick stats fetch failed: {err}")),
    }

    // Newest first for display; the points series above stays chronological.
    processed_events.reverse();

    season.win = wins;
    season.loss = losses;
    season.ties = ties;
    season.avg_points = analysis::format_avg_points(total_points, games_played);
    season.role_prediction = analysis::team_role_prediction(&specimens, &samples);
    season.specimens = specimens;
    season.samples = samples;
    season.points = points;
    season.events = processed_events;

    CorePass {
        season,
        errors,
        fatal: None,
    }
}

/// Fields recomputed by the extension pass. Applied as an explicit partial
/// merge so a failed half never clobbers the other's persisted value.
#[derive(Debug, Clone, Default)]
pub struct ExtensionUpdate {
    pub luck_score: Option<String>,
    pub ai_insight: Option<String>,
}

impl ExtensionUpdate {
    pub fn is_empty(&self) -> bool {
        self.luck_score.is_none() && self.ai_insight.is_none()
    }

    pub fn apply(&self, team: &mut Team) {
        let Some(season) = team.current_season_mut() else {
            return;
        };
        if let Some(luck_score) = &self.luck_score {
            season.luck_score = luck_score.clone();
        }
        if let Some(ai_insight) = &self.ai_insight {
            season.ai_insight = ai_insight.clone();
        }
    }
}

pub struct ExtensionPass {
    pub update: ExtensionUpdate,
    pub errors: Vec<String>,
    /// True when the season has no events and there was nothing to extend.
    pub skipped: bool,
}

/// Derives the luck score from the match graph and asks the insight
/// generator for season analysis. Either half may fail independently; the
/// other still lands.
pub fn reconcile_extension<G, I>(
    graph_source: &G,
    insight_generator: &I,
    team_number: u32,
    team: &Team,
) -> ExtensionPass
where
    G: MatchGraphSource,
    I: InsightGenerator,
{
    let has_events = team
        .current_season()
        .is_some_and(|season| !season.events.is_empty());
    if !has_events {
        return ExtensionPass {
            update: ExtensionUpdate::default(),
            errors: Vec::new(),
            skipped: true,
        };
    }

    let mut errors = Vec::new();
    let mut update = ExtensionUpdate::default();

    match graph_source.match_graph(team_number) {
        Ok(Some(graph)) => {
            update.luck_score = Some(format!("{:.2}", luck_from_graph(&graph)));
        }
        Ok(None) => errors.push("match graph has no record of this team".to_string()),
        Err(err) => errors.push(format!("match graph fetch failed: {err}")),
    }

    match insight_generator.generate(team) {
        Ok(text) => update.ai_insight = Some(text),
        Err(err) => errors.push(format!("insight generation failed: {err}")),
    }

    ExtensionPass {
        update,
        errors,
        skipped: false,
    }
}

/// Sums alliance-partner OPR against halved opponent-alliance OPR over the
/// team's qualification matches and feeds the totals to the carried-score
/// estimator. A participant without quick-stats ends the roster scan for
/// that match; the match still counts toward games played.
pub fn luck_from_graph(graph: &TeamGraph) -> f64 {
    let mut total_partner_opr = 0.0;
    let mut total_opponent_opr = 0.0;
    let mut games_played = 0usize;

    for entry in &graph.matches {
        if !entry.detail.is_quals() {
            continue;
        }
        let mut partner_opr = 0.0;
        let mut opponent_opr = 0.0;
        for participant in &entry.detail.teams {
            let Some(stats) = &participant.team.quick_stats else {
                break;
            };
            let value = stats.tot.value;
            if participant.alliance == entry.alliance && participant.team.number != graph.number {
                partner_opr += value;
            }
            if participant.alliance != entry.alliance {
                opponent_opr += value;
            }
        }
        games_played += 1;
        total_partner_opr += partner_opr;
        // The opponent sum spans two teams; halve it to a per-team scale.
        total_opponent_opr += opponent_opr / 2.0;
    }

    analysis::carried_score(total_partner_opr, total_opponent_opr, games_played)
}

struct EventBundle {
    matches: Result<Vec<RawMatch>>,
    scores: Result<HashMap<u32, RawMatchScore>>,
}

fn fetch_event_bundles<O>(official: &O, events: &[EventListing]) -> Vec<EventBundle>
where
    O: OfficialEvents + Sync,
{
    with_fetch_pool(|| {
        events
            .par_iter()
            .map(|listing| EventBundle {
                matches: official.event_matches(&listing.code),
                scores: official.score_details(&listing.code, TournamentLevel::Qual),
            })
            .collect()
    })
}

pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

pub fn format_event_date(raw: &str) -> String {
    match parse_event_date(raw) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => "Unknown".to_string(),
    }
}

fn with_fetch_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let threads = fetch_parallelism();
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}
