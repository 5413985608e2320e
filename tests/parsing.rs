use std::fs;
use std::path::PathBuf;

use ftc_master::events_api::{
    parse_event_matches_json, parse_event_rankings_json, parse_score_details_json,
    parse_team_events_json, parse_team_profile_json,
};
use ftc_master::insight::{format_insight, parse_completion_json};
use ftc_master::model::Alliance;
use ftc_master::scout_api::{
    parse_match_graph_json, parse_quick_stats_json, parse_team_search_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn team_profile_parses_location_fields() {
    let raw = read_fixture("team_profile.json");
    let profile = parse_team_profile_json(&raw)
        .expect("fixture should parse")
        .expect("fixture has one team");
    assert_eq!(profile.location(), "Brooklyn, NY, USA");
    assert_eq!(profile.rookie_year, Some(2019));
    assert_eq!(profile.sponsors.len(), 2);
}

#[test]
fn team_profile_null_body_is_none() {
    assert!(parse_team_profile_json("null").expect("null is valid").is_none());
    assert!(parse_team_profile_json("  ").expect("blank is valid").is_none());
}

#[test]
fn team_events_parse_in_upstream_order() {
    let raw = read_fixture("team_events.json");
    let events = parse_team_events_json(&raw).expect("fixture should parse");
    assert_eq!(events.len(), 2);
    // Upstream returns newest first here; chronology is the caller's job.
    assert_eq!(events[0].code, "USNYBRQ2");
    assert_eq!(events[1].code, "USNYBRQ1");
}

#[test]
fn event_matches_expose_alliance_by_station() {
    let raw = read_fixture("event_matches.json");
    let matches = parse_event_matches_json(&raw).expect("fixture should parse");
    assert_eq!(matches.len(), 2);

    let qual = &matches[0];
    assert!(qual.is_qualification());
    assert_eq!(qual.alliance_of(9876), Some(Alliance::Red));
    assert_eq!(qual.alliance_of(4444), Some(Alliance::Blue));
    assert_eq!(qual.alliance_of(5555), None);

    assert!(!matches[1].is_qualification());
}

#[test]
fn event_rankings_parse_sort_orders() {
    let raw = read_fixture("event_rankings.json");
    let rows = parse_event_rankings_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    let second = &rows[1];
    assert_eq!(second.team_number, 9876);
    assert_eq!(second.rank, 2);
    assert_eq!(second.sort_order1, 3.0);
    assert_eq!(second.sort_order4, 81.0);
}

#[test]
fn score_details_weight_samples_and_specimens() {
    let raw = read_fixture("score_details.json");
    let scores = parse_score_details_json(&raw).expect("fixture should parse");
    assert_eq!(scores.len(), 1);
    let red = scores[0].side(Alliance::Red).expect("red side present");
    // net 4, low 3, high 2 -> 4*2 + 3*4 + 2*8 = 36
    assert_eq!(red.sample_points(), 36);
    // low 3, high 2 -> 3*6 + 2*10 = 38
    assert_eq!(red.specimen_points(), 38);
    let blue = scores[0].side(Alliance::Blue).expect("blue side present");
    assert_eq!(blue.sample_points(), 18);
}

#[test]
fn quick_stats_parse_ranked_values() {
    let raw = read_fixture("quick_stats.json");
    let stats = parse_quick_stats_json(&raw)
        .expect("fixture should parse")
        .expect("fixture has stats");
    assert_eq!(stats.number, 9876);
    assert_eq!(stats.tot.rank, 305);
    assert!((stats.tot.value - 101.7).abs() < 1e-9);
    assert_eq!(stats.count, 7641);
}

#[test]
fn match_graph_parses_nested_participants() {
    let raw = read_fixture("match_graph.json");
    let graph = parse_match_graph_json(&raw)
        .expect("fixture should parse")
        .expect("fixture has a team");
    assert_eq!(graph.number, 9876);
    assert_eq!(graph.matches.len(), 3);
    assert!(graph.matches[0].detail.is_quals());
    assert!(!graph.matches[1].detail.is_quals());

    let first = &graph.matches[0].detail.teams;
    assert_eq!(first.len(), 4);
    let partner = &first[1];
    assert_eq!(partner.team.number, 1111);
    let stats = partner.team.quick_stats.as_ref().expect("partner has stats");
    assert!((stats.tot.value - 74.0).abs() < 1e-9);

    // Third match has a participant with null quickStats.
    assert!(graph.matches[2].detail.teams[0].team.quick_stats.is_none());
}

#[test]
fn match_graph_missing_team_is_none() {
    let raw = r#"{"data":{"teamByNumber":null}}"#;
    assert!(parse_match_graph_json(raw).expect("valid response").is_none());
}

#[test]
fn graphql_errors_are_surfaced() {
    let raw = r#"{"data":null,"errors":[{"message":"rate limited"}]}"#;
    let err = parse_match_graph_json(raw).expect_err("errors should fail");
    assert!(err.to_string().contains("rate limited"));
}

#[test]
fn team_search_parses_directory() {
    let raw = read_fixture("team_search.json");
    let teams = parse_team_search_json(&raw).expect("fixture should parse");
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0].number, 9876);
    assert_eq!(teams[0].name, "Voltage Vipers");
}

#[test]
fn completion_content_is_extracted() {
    let raw = read_fixture("completion.json");
    let content = parse_completion_json(&raw).expect("fixture should parse");
    assert!(content.starts_with("$STRENGTH:"));

    let insight = format_insight(&content);
    let strength = insight.strength.expect("strength section present");
    assert!(strength.contains("High teleop output"));
    let weakness = insight.weakness.expect("weakness section present");
    assert!(weakness.contains("Weak autonomous"));
    assert_eq!(insight.score.as_deref(), Some("7.5"));
}

#[test]
fn completion_without_choices_is_an_error() {
    assert!(parse_completion_json(r#"{"choices":[]}"#).is_err());
}

#[test]
fn format_insight_tolerates_stray_closing_markers() {
    let text = "$STRENGTH: <li>fast</li> </$STRENGTH$> $WEAKNESS: <li>slow auto</li> </$WEAKNESS$> $SCORE: 6.0";
    let insight = format_insight(text);
    assert_eq!(insight.strength.as_deref(), Some("<li>fast</li>"));
    assert_eq!(insight.weakness.as_deref(), Some("<li>slow auto</li>"));
    assert_eq!(insight.score.as_deref(), Some("6.0"));
}

#[test]
fn format_insight_on_placeholder_has_no_sections() {
    let insight = format_insight("No insights available.");
    assert!(insight.strength.is_none());
    assert!(insight.weakness.is_none());
    assert!(insight.score.is_none());
}
