use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::http_client::http_client;
use crate::model::{DEFAULT_SEASON_YEAR, QuickStats, TeamRef};

const FTC_SCOUT_BASE: &str = "https://api.ftcscout.org";

/// Ranked OPR-style metrics for one team (REST quick-stats endpoint).
pub trait QuickStatsSource {
    /// `Ok(None)` when the team has no ranked stats this season.
    fn quick_stats(&self, team_number: u32) -> Result<Option<QuickStats>>;
}

/// Nested graph of a team's matches with each participant's total-OPR,
/// consumed only by the extension (luck-score) pass.
pub trait MatchGraphSource {
    fn match_graph(&self, team_number: u32) -> Result<Option<TeamGraph>>;
}

/// Full team-number -> name directory (search query), loaded once per
/// session by the team directory layer.
pub trait TeamDirectorySource {
    fn team_search(&self) -> Result<Vec<TeamRef>>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGraph {
    pub number: u32,
    #[serde(default)]
    pub quick_stats: Option<GraphQuickStats>,
    #[serde(default)]
    pub matches: Vec<GraphMatchEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQuickStats {
    pub tot: GraphStatValue,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GraphStatValue {
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphMatchEntry {
    #[serde(default)]
    pub alliance: String,
    #[serde(rename = "match")]
    pub detail: GraphMatch,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMatch {
    #[serde(default)]
    pub tournament_level: String,
    #[serde(default)]
    pub teams: Vec<GraphParticipant>,
}

impl GraphMatch {
    // The graph API spells qualification rounds "Quals" (the events API
    // says "QUALIFICATION").
    pub fn is_quals(&self) -> bool {
        self.tournament_level.eq_ignore_ascii_case("Quals")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphParticipant {
    #[serde(default)]
    pub alliance: String,
    pub team: GraphTeam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTeam {
    pub number: u32,
    #[serde(default)]
    pub quick_stats: Option<GraphQuickStats>,
}

/// HTTP client for the FTC Scout API (REST quick-stats + GraphQL).
pub struct FtcScoutClient {
    base: String,
    season: u32,
}

impl Default for FtcScoutClient {
    fn default() -> Self {
        Self {
            base: FTC_SCOUT_BASE.to_string(),
            season: DEFAULT_SEASON_YEAR,
        }
    }
}

impl FtcScoutClient {
    fn graphql(&self, query: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}/graphql", self.base);
        let resp = client
            .post(&url)
            .json(&serde_json::json!({ "query": query }))
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

impl QuickStatsSource for FtcScoutClient {
    fn quick_stats(&self, team_number: u32) -> Result<Option<QuickStats>> {
        let client = http_client()?;
        let url = format!(
            "{}/rest/v1/teams/{team_number}/quick-stats?season={}",
            self.base, self.season
        );
        let resp = client
            .get(&url)
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status}: {body}"));
        }
        parse_quick_stats_json(&body)
    }
}

impl MatchGraphSource for FtcScoutClient {
    fn match_graph(&self, team_number: u32) -> Result<Option<TeamGraph>> {
        let season = self.season;
        let query = format!(
            "{{ teamByNumber(number: {team_number}) {{ \
               name number \
               quickStats(season: {season}) {{ tot {{ value }} }} \
               matches(season: {season}) {{ \
                 alliance \
                 match {{ \
                   tournamentLevel \
                   teams {{ \
                     alliance \
                     team {{ number quickStats(season: {season}) {{ tot {{ value }} }} }} \
                   }} \
                 }} \
               }} \
             }} }}"
        );
        let body = self.graphql(&query)?;
        parse_match_graph_json(&body)
    }
}

impl TeamDirectorySource for FtcScoutClient {
    fn team_search(&self) -> Result<Vec<TeamRef>> {
        let query = "{ teamsSearch(limit: 100000) { name number } }";
        let body = self.graphql(query)?;
        parse_team_search_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamByNumberData {
    team_by_number: Option<TeamGraph>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamSearchData {
    #[serde(default)]
    teams_search: Vec<TeamRef>,
}

pub fn parse_quick_stats_json(raw: &str) -> Result<Option<QuickStats>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let stats: QuickStats =
        serde_json::from_str(trimmed).context("invalid quick-stats json")?;
    Ok(Some(stats))
}

pub fn parse_match_graph_json(raw: &str) -> Result<Option<TeamGraph>> {
    let resp: GraphResponse<TeamByNumberData> =
        serde_json::from_str(raw.trim()).context("invalid match graph json")?;
    if let Some(err) = resp.errors.first() {
        return Err(anyhow!("graphql error: {}", err.message));
    }
    Ok(resp.data.and_then(|data| data.team_by_number))
}

pub fn parse_team_search_json(raw: &str) -> Result<Vec<TeamRef>> {
    let resp: GraphResponse<TeamSearchData> =
        serde_json::from_str(raw.trim()).context("invalid team search json")?;
    if let Some(err) = resp.errors.first() {
        return Err(anyhow!("graphql error: {}", err.message));
    }
    Ok(resp.data.map(|data| data.teams_search).unwrap_or_default())
}
