use ftc_master::analysis::{carried_score, format_avg_points, team_role_prediction};
use ftc_master::reconcile::luck_from_graph;
use ftc_master::scout_api::parse_match_graph_json;

fn pct(raw: &str) -> f64 {
    raw.parse::<f64>().expect("percentage should be numeric")
}

#[test]
fn role_prediction_shares_sum_to_hundred() {
    let samples = vec![40, 52, 48, 61];
    let specimens = vec![30, 12, 44, 6];
    let role = team_role_prediction(&specimens, &samples);
    let total = pct(&role.percent_samples) + pct(&role.percent_specimens);
    assert!((total - 100.0).abs() < 0.011, "shares sum to {total}");
    // The steadier, higher-output category dominates.
    assert!(pct(&role.percent_samples) > pct(&role.percent_specimens));
}

#[test]
fn role_prediction_without_data_is_even_split() {
    let role = team_role_prediction(&[], &[]);
    assert_eq!(role.percent_samples, "50.00");
    assert_eq!(role.percent_specimens, "50.00");
}

#[test]
fn role_prediction_single_category_takes_all() {
    let role = team_role_prediction(&[], &[40, 50]);
    assert_eq!(role.percent_samples, "100.00");
    assert_eq!(role.percent_specimens, "0.00");

    let role = team_role_prediction(&[20, 25], &[]);
    assert_eq!(role.percent_samples, "0.00");
    assert_eq!(role.percent_specimens, "100.00");
}

#[test]
fn perfectly_consistent_category_wins_outright() {
    // Identical values -> zero stddev -> that category takes the split.
    let role = team_role_prediction(&[10, 30], &[44, 44, 44]);
    assert_eq!(role.percent_samples, "100.00");
    assert_eq!(role.percent_specimens, "0.00");
}

#[test]
fn both_consistent_categories_split_evenly() {
    let role = team_role_prediction(&[30, 30], &[44, 44]);
    assert_eq!(role.percent_samples, "50.00");
    assert_eq!(role.percent_specimens, "50.00");
}

#[test]
fn all_zero_scores_split_evenly() {
    // Zero-mean, nonzero-stddev inputs give both categories a zero score.
    let role = team_role_prediction(&[-5, 5], &[-3, 3]);
    assert_eq!(role.percent_samples, "50.00");
    assert_eq!(role.percent_specimens, "50.00");
}

#[test]
fn carried_score_is_scaled_average_delta() {
    // Partners averaged 10 OPR stronger than (per-team) opponents.
    let score = carried_score(300.0, 250.0, 5);
    assert!((score - 20.0).abs() < 1e-9);
}

#[test]
fn carried_score_without_games_is_zero() {
    assert_eq!(carried_score(120.0, 90.0, 0), 0.0);
}

#[test]
fn carried_score_negative_when_opponents_stronger() {
    assert!(carried_score(100.0, 200.0, 4) < 0.0);
}

#[test]
fn avg_points_formats_one_decimal() {
    assert_eq!(format_avg_points(155, 3), "51.7");
    assert_eq!(format_avg_points(0, 0), "0");
    assert_eq!(format_avg_points(0, 4), "0.0");
}

#[test]
fn luck_from_graph_uses_quals_and_halves_opponents() {
    let raw = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/match_graph.json"
    ))
    .expect("fixture file should be readable");
    let graph = parse_match_graph_json(&raw)
        .expect("fixture should parse")
        .expect("fixture has a team");

    // Match 1 (Quals, red): partner 74.0, opponents (88.0 + 52.0) / 2 = 70.0.
    // Match 2 is a playoff and is skipped. Match 3 (Quals) hits a participant
    // with no quick-stats before any accumulation, so it contributes only to
    // games played.
    // carried_score(74.0, 70.0, 2) = 2 * (37.0 - 35.0) = 4.0
    let luck = luck_from_graph(&graph);
    assert!((luck - 4.0).abs() < 1e-9, "luck was {luck}");
}
