use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::insight::format_insight;
use crate::model::{MatchRecord, SeasonEvent, Team, TeamRef};

/// Writes one team's cached record as a workbook: season summary, per-event
/// results, every match with rosters, the chronological points series, and
/// the quick-stats block.
pub fn write_team_workbook(team: &Team, path: &Path) -> Result<()> {
    let season = team
        .current_season()
        .ok_or_else(|| anyhow!("team {} has no season data", team.number))?;

    let insight = format_insight(&season.ai_insight);

    let summary_rows = vec![
        row(["Field", "Value"]),
        row(["Team", &team.number.to_string()]),
        row(["Name", &team.name]),
        row(["Season", &season.year]),
        row(["Location", &season.location]),
        row(["Rookie Year", &season.rookie_year]),
        row(["Wins", &season.win.to_string()]),
        row(["Losses", &season.loss.to_string()]),
        row(["Ties", &season.ties.to_string()]),
        row(["Avg Points", &season.avg_points]),
        row(["Luck Score", &season.luck_score]),
        row(["% Samples", &season.role_prediction.percent_samples]),
        row(["% Specimens", &season.role_prediction.percent_specimens]),
        row(["Strengths", insight.strength.as_deref().unwrap_or("")]),
        row(["Weaknesses", insight.weakness.as_deref().unwrap_or("")]),
        row(["AI Score", insight.score.as_deref().unwrap_or("")]),
    ];

    let mut events_rows = vec![row([
        "Event", "Start", "End", "Rank", "Field Size", "Quals", "Playoffs",
    ])];
    for event in &season.events {
        events_rows.push(event_row(event));
    }

    let mut matches_rows = vec![row([
        "Event", "Level", "Match", "Alliance", "Points", "Red Score", "Blue Score", "Red Teams",
        "Blue Teams",
    ])];
    for event in &season.events {
        for m in &event.quals {
            matches_rows.push(match_row(&event.name, "Qualification", m));
        }
        for m in &event.playoffs {
            matches_rows.push(match_row(&event.name, "Playoff", m));
        }
    }

    let mut points_rows = vec![row(["Match", "Points", "Samples", "Specimens"])];
    for (idx, entry) in season.points.iter().enumerate() {
        points_rows.push(vec![
            entry.match_number.to_string(),
            entry.points.to_string(),
            season
                .samples
                .get(idx)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            season
                .specimens
                .get(idx)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ]);
    }

    let stats = &season.quick_stats;
    let quick_rows = vec![
        row(["Metric", "Value", "Rank"]),
        stat_row("Auto", stats.auto.value, stats.auto.rank),
        stat_row("Driver Control", stats.dc.value, stats.dc.rank),
        stat_row("Endgame", stats.eg.value, stats.eg.rank),
        stat_row("Total", stats.tot.value, stats.tot.rank),
        vec!["Teams Ranked".to_string(), stats.count.to_string(), String::new()],
    ];

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Events")?;
        write_rows(sheet, &events_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &matches_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("PointsSeries")?;
        write_rows(sheet, &points_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("QuickStats")?;
        write_rows(sheet, &quick_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn event_row(event: &SeasonEvent) -> Vec<String> {
    vec![
        event.name.clone(),
        event.date_start.clone(),
        event.date_end.clone(),
        event.rank.to_string(),
        event.teams.to_string(),
        event.quals.len().to_string(),
        event.playoffs.len().to_string(),
    ]
}

fn match_row(event_name: &str, level: &str, m: &MatchRecord) -> Vec<String> {
    vec![
        event_name.to_string(),
        level.to_string(),
        m.match_number.to_string(),
        m.alliance.label().to_string(),
        m.points.to_string(),
        m.red_score.to_string(),
        m.blue_score.to_string(),
        roster(&m.red_teams),
        roster(&m.blue_teams),
    ]
}

fn roster(teams: &[TeamRef]) -> String {
    teams
        .iter()
        .map(|t| format!("{} ({})", t.name, t.number))
        .collect::<Vec<_>>()
        .join(", ")
}

fn stat_row(metric: &str, value: f64, rank: u32) -> Vec<String> {
    vec![metric.to_string(), format!("{value:.2}"), rank.to_string()]
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
