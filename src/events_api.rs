use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::http_client::http_client;
use crate::model::{Alliance, DEFAULT_SEASON_YEAR};

const FTC_EVENTS_BASE: &str = "https://ftc-api.firstinspires.org/v2.0";

/// Read-only view of the official FIRST events API. The reconciliation
/// engine depends on this trait, never on the HTTP client, so tests can
/// substitute canned sources.
pub trait OfficialEvents {
    /// `Ok(None)` when the team is unknown upstream.
    fn team_profile(&self, team_number: u32) -> Result<Option<TeamProfile>>;
    /// Empty list is a valid result (team has not registered for events).
    /// Upstream order is unspecified; callers re-derive chronology.
    fn team_events(&self, team_number: u32) -> Result<Vec<EventListing>>;
    fn event_matches(&self, event_code: &str) -> Result<Vec<RawMatch>>;
    /// Empty when rankings are not yet posted.
    fn event_rankings(&self, event_code: &str) -> Result<Vec<RawRankingRow>>;
    /// Keyed by match number; entries may be missing for individual matches.
    fn score_details(
        &self,
        event_code: &str,
        level: TournamentLevel,
    ) -> Result<HashMap<u32, RawMatchScore>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentLevel {
    Qual,
    Playoff,
}

impl TournamentLevel {
    fn path_segment(self) -> &'static str {
        match self {
            TournamentLevel::Qual => "qual",
            TournamentLevel::Playoff => "playoff",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfile {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state_prov: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rookie_year: Option<i32>,
    #[serde(default)]
    pub sponsors: Vec<String>,
}

impl TeamProfile {
    pub fn location(&self) -> String {
        format!("{}, {}, {}", self.city, self.state_prov, self.country)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_end: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub match_number: u32,
    #[serde(default)]
    pub tournament_level: String,
    #[serde(default)]
    pub score_red_final: i64,
    #[serde(default)]
    pub score_blue_final: i64,
    #[serde(default)]
    pub teams: Vec<RawMatchTeam>,
}

impl RawMatch {
    pub fn is_qualification(&self) -> bool {
        self.tournament_level.eq_ignore_ascii_case("QUALIFICATION")
    }

    /// This team's alliance, from its station letter ("Red1", "Blue2", ...).
    pub fn alliance_of(&self, team_number: u32) -> Option<Alliance> {
        self.teams
            .iter()
            .find(|t| t.team_number == team_number)
            .map(|t| t.alliance())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchTeam {
    pub team_number: u32,
    #[serde(default)]
    pub station: String,
}

impl RawMatchTeam {
    pub fn alliance(&self) -> Alliance {
        if self.station.starts_with('R') {
            Alliance::Red
        } else {
            Alliance::Blue
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRankingRow {
    pub rank: u32,
    pub team_number: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub sort_order1: f64,
    #[serde(default)]
    pub sort_order2: f64,
    #[serde(default)]
    pub sort_order3: f64,
    #[serde(default)]
    pub sort_order4: f64,
    #[serde(default)]
    pub matches_played: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchScore {
    pub match_number: u32,
    #[serde(default)]
    pub alliances: Vec<RawAllianceScore>,
}

impl RawMatchScore {
    pub fn side(&self, alliance: Alliance) -> Option<&RawAllianceScore> {
        self.alliances
            .iter()
            .find(|a| a.alliance.eq_ignore_ascii_case(alliance.label()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAllianceScore {
    #[serde(default)]
    pub alliance: String,
    #[serde(default)]
    pub teleop_sample_net: i64,
    #[serde(default)]
    pub teleop_sample_low: i64,
    #[serde(default)]
    pub teleop_sample_high: i64,
    #[serde(default)]
    pub teleop_specimen_low: i64,
    #[serde(default)]
    pub teleop_specimen_high: i64,
}

impl RawAllianceScore {
    // 2024 game point weights: net 2, low basket 4, high basket 8.
    pub fn sample_points(&self) -> i64 {
        self.teleop_sample_net * 2 + self.teleop_sample_low * 4 + self.teleop_sample_high * 8
    }

    // Low chamber 6, high chamber 10.
    pub fn specimen_points(&self) -> i64 {
        self.teleop_specimen_low * 6 + self.teleop_specimen_high * 10
    }
}

/// HTTP client for the official events API. Credentials come from the
/// `FTC_USERNAME` / `FTC_TOKEN` env vars (HTTP Basic).
pub struct FtcEventsClient {
    base: String,
    season: u32,
    auth_header: String,
}

impl FtcEventsClient {
    pub fn from_env() -> Result<Self> {
        let username =
            env::var("FTC_USERNAME").context("FTC_USERNAME not set")?;
        let token = env::var("FTC_TOKEN").context("FTC_TOKEN not set")?;
        let credentials = BASE64.encode(format!("{username}:{token}"));
        Ok(Self {
            base: FTC_EVENTS_BASE.to_string(),
            season: DEFAULT_SEASON_YEAR,
            auth_header: format!("Basic {credentials}"),
        })
    }

    fn fetch(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}/{}/{}", self.base, self.season, path);
        let resp = client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status}: {body}"));
        }
        Ok(body)
    }
}

impl OfficialEvents for FtcEventsClient {
    fn team_profile(&self, team_number: u32) -> Result<Option<TeamProfile>> {
        let body = self.fetch(&format!("teams?teamNumber={team_number}"))?;
        parse_team_profile_json(&body)
    }

    fn team_events(&self, team_number: u32) -> Result<Vec<EventListing>> {
        let body = self.fetch(&format!("events?teamNumber={team_number}"))?;
        parse_team_events_json(&body)
    }

    fn event_matches(&self, event_code: &str) -> Result<Vec<RawMatch>> {
        let body = self.fetch(&format!("matches/{event_code}"))?;
        parse_event_matches_json(&body)
    }

    fn event_rankings(&self, event_code: &str) -> Result<Vec<RawRankingRow>> {
        let body = self.fetch(&format!("rankings/{event_code}"))?;
        parse_event_rankings_json(&body)
    }

    fn score_details(
        &self,
        event_code: &str,
        level: TournamentLevel,
    ) -> Result<HashMap<u32, RawMatchScore>> {
        let body = self.fetch(&format!("scores/{event_code}/{}", level.path_segment()))?;
        let scores = parse_score_details_json(&body)?;
        Ok(score_map(scores))
    }
}

pub fn score_map(scores: Vec<RawMatchScore>) -> HashMap<u32, RawMatchScore> {
    scores
        .into_iter()
        .map(|score| (score.match_number, score))
        .collect()
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<TeamProfile>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<EventListing>,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RankingsResponse {
    #[serde(rename = "rankings", default)]
    rankings: Vec<RawRankingRow>,
}

#[derive(Debug, Deserialize)]
struct ScoresResponse {
    #[serde(rename = "matchScores", default)]
    match_scores: Vec<RawMatchScore>,
}

pub fn parse_team_profile_json(raw: &str) -> Result<Option<TeamProfile>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(None);
    };
    let resp: TeamsResponse =
        serde_json::from_str(trimmed).context("invalid teams json")?;
    Ok(resp.teams.into_iter().next())
}

pub fn parse_team_events_json(raw: &str) -> Result<Vec<EventListing>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let resp: EventsResponse =
        serde_json::from_str(trimmed).context("invalid events json")?;
    Ok(resp.events)
}

pub fn parse_event_matches_json(raw: &str) -> Result<Vec<RawMatch>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let resp: MatchesResponse =
        serde_json::from_str(trimmed).context("invalid matches json")?;
    Ok(resp.matches)
}

pub fn parse_event_rankings_json(raw: &str) -> Result<Vec<RawRankingRow>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let resp: RankingsResponse =
        serde_json::from_str(trimmed).context("invalid rankings json")?;
    Ok(resp.rankings)
}

pub fn parse_score_details_json(raw: &str) -> Result<Vec<RawMatchScore>> {
    let Some(trimmed) = non_null(raw) else {
        return Ok(Vec::new());
    };
    let resp: ScoresResponse =
        serde_json::from_str(trimmed).context("invalid score details json")?;
    Ok(resp.match_scores)
}

fn non_null(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        Some(trimmed)
    }
}
