use crate::model::RolePrediction;

/// Maximum plausible per-match teleop sample output (2024 game).
pub const MAX_SAMPLE: f64 = 160.0;
/// Maximum plausible per-match teleop specimen output (2024 game).
pub const MAX_SPECIMEN: f64 = 230.0;

/// Empirically chosen scale for the carried-score statistic; kept as-is for
/// behavioral compatibility.
pub const LUCK_SCALE: f64 = 2.0;

/// Splits a team's scoring specialty between samples and specimens from the
/// consistency of each category's per-match output. Each list is normalized
/// by its fixed per-match maximum, then scored as mean / population stddev
/// (signal-to-noise); the percentages are the scores' shares of their sum.
///
/// A zero stddev means perfectly consistent output and takes the whole
/// split; when neither category has a usable score the split is 50/50.
pub fn team_role_prediction(specimens: &[i64], samples: &[i64]) -> RolePrediction {
    let score_samples = category_score(samples, MAX_SAMPLE);
    let score_specimens = category_score(specimens, MAX_SPECIMEN);

    let (percent_samples, percent_specimens) = match (score_samples, score_specimens) {
        (None, None) => (50.0, 50.0),
        (Some(_), None) => (100.0, 0.0),
        (None, Some(_)) => (0.0, 100.0),
        (Some(sam), Some(spec)) => {
            if sam.is_infinite() && spec.is_infinite() {
                (50.0, 50.0)
            } else if sam.is_infinite() {
                (100.0, 0.0)
            } else if spec.is_infinite() {
                (0.0, 100.0)
            } else {
                let total = sam + spec;
                if total == 0.0 {
                    (50.0, 50.0)
                } else {
                    (sam / total * 100.0, spec / total * 100.0)
                }
            }
        }
    };

    RolePrediction {
        percent_samples: format!("{percent_samples:.2}"),
        percent_specimens: format!("{percent_specimens:.2}"),
    }
}

/// Descriptive "matchup advantage" statistic: positive when the alliance
/// partners a team drew were statistically stronger than the opponents it
/// faced. Inputs are the OPR totals accumulated over qualification matches
/// (opponent sums pre-halved per match, since they span two teams).
pub fn carried_score(total_partner_opr: f64, total_opponent_opr: f64, games_played: usize) -> f64 {
    if games_played == 0 {
        return 0.0;
    }
    let avg_partner_opr = total_partner_opr / games_played as f64;
    let avg_opponent_opr = total_opponent_opr / games_played as f64;
    LUCK_SCALE * (avg_partner_opr - avg_opponent_opr)
}

/// Average points per game, one decimal place; "0" when no games played.
pub fn format_avg_points(total_points: i64, games_played: u32) -> String {
    if games_played == 0 {
        return "0".to_string();
    }
    format!("{:.1}", total_points as f64 / games_played as f64)
}

fn category_score(values: &[i64], max: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let normalized: Vec<f64> = values.iter().map(|v| *v as f64 / max).collect();
    let mean = mean(&normalized);
    let std = std_dev(&normalized);
    if std == 0.0 {
        Some(f64::INFINITY)
    } else {
        Some(mean / std)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
