use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use ftc_master::coordinator::{LoadState, TeamLoader};
use ftc_master::events_api::{FtcEventsClient, OfficialEvents};
use ftc_master::export::write_team_workbook;
use ftc_master::fake_source::FakeSource;
use ftc_master::insight::{InsightGenerator, OpenAiInsight, format_insight};
use ftc_master::model::{LUCK_SENTINEL, Team};
use ftc_master::scout_api::{FtcScoutClient, MatchGraphSource, QuickStatsSource};
use ftc_master::store::Store;
use ftc_master::team_directory::load_team_map;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let store = Store::open_default()?;

    match args.first().map(String::as_str) {
        Some("--list") => list_teams(&store),
        Some("--delete") => {
            let number = parse_team_number(args.get(1))?;
            if store.delete_team(number)? {
                println!("Deleted cached record for team {number}.");
            } else {
                println!("No cached record for team {number}.");
            }
            Ok(())
        }
        Some("--export") => {
            let number = parse_team_number(args.get(1))?;
            let path = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("team_{number}.xlsx")));
            let team = lookup(&store, number)?;
            write_team_workbook(&team, &path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Some(raw) => {
            let number = parse_team_number(Some(&raw.to_string()))?;
            let team = lookup(&store, number)?;
            print_team(&team);
            Ok(())
        }
        None => Err(anyhow!(
            "usage: ftc_master <teamNumber> | --list | --delete <teamNumber> | --export <teamNumber> [path.xlsx]"
        )),
    }
}

fn parse_team_number(arg: Option<&String>) -> Result<u32> {
    arg.ok_or_else(|| anyhow!("missing team number"))?
        .parse::<u32>()
        .map_err(|_| anyhow!("team number must be a positive integer"))
}

fn lookup(store: &Store, number: u32) -> Result<Team> {
    if fake_mode() {
        let fake = FakeSource::seeded();
        let team_map = load_team_map(store, &fake, refresh_directory())?;
        run_loader(store, &fake, &fake, &fake, &fake, &team_map, number)
    } else {
        let official = FtcEventsClient::from_env()?;
        let scout = FtcScoutClient::default();
        let insight = match OpenAiInsight::from_env() {
            Ok(generator) => InsightBackend::OpenAi(generator),
            Err(_) => {
                eprintln!("OPENAI_API_KEY not set; skipping AI insight.");
                InsightBackend::Disabled
            }
        };
        let team_map = load_team_map(store, &scout, refresh_directory())?;
        run_loader(store, &official, &scout, &scout, &insight, &team_map, number)
    }
}

fn run_loader<O, Q, G, I>(
    store: &Store,
    official: &O,
    quick: &Q,
    graph: &G,
    insight: &I,
    team_map: &ftc_master::model::TeamMap,
    number: u32,
) -> Result<Team>
where
    O: OfficialEvents + Sync,
    Q: QuickStatsSource,
    G: MatchGraphSource,
    I: InsightGenerator,
{
    let mut loader = TeamLoader::new(store, official, quick, graph, insight, team_map);
    loader.load(number);

    for error in &loader.errors {
        eprintln!("warning: {error}");
    }
    if let LoadState::Error(message) = &loader.state {
        if loader.team.is_none() {
            return Err(anyhow!("lookup failed: {message}"));
        }
        eprintln!("warning: {message} (showing partial data)");
    }
    loader
        .team
        .take()
        .ok_or_else(|| anyhow!("no data for team {number}"))
}

/// Insight generation is optional at the CLI: without an API key the
/// extension pass still computes the luck score and records the miss.
enum InsightBackend {
    OpenAi(OpenAiInsight),
    Disabled,
}

impl InsightGenerator for InsightBackend {
    fn generate(&self, team: &Team) -> Result<String> {
        match self {
            InsightBackend::OpenAi(generator) => generator.generate(team),
            InsightBackend::Disabled => Err(anyhow!("insight generation disabled")),
        }
    }
}

fn list_teams(store: &Store) -> Result<()> {
    let teams = store.all_teams()?;
    if teams.is_empty() {
        println!("No cached teams.");
        return Ok(());
    }
    for team in teams {
        let record = team
            .current_season()
            .map(|s| format!("{}-{}-{}", s.win, s.loss, s.ties))
            .unwrap_or_else(|| "no season".to_string());
        println!("{:>6}  {}  (v{}, {record})", team.number, team.name, team.version);
    }
    Ok(())
}

fn print_team(team: &Team) {
    println!("Team {} — {}", team.number, team.name);
    let Some(season) = team.current_season() else {
        println!("  No season data.");
        return;
    };
    println!("  Season:      {}", season.year);
    println!("  Location:    {}", season.location);
    println!("  Rookie year: {}", season.rookie_year);
    println!(
        "  Record:      {}-{}-{} (avg {} pts)",
        season.win, season.loss, season.ties, season.avg_points
    );
    if season.luck_score != LUCK_SENTINEL {
        println!("  Luck score:  {}", season.luck_score);
    }
    println!(
        "  Role split:  {}% samples / {}% specimens",
        season.role_prediction.percent_samples, season.role_prediction.percent_specimens
    );
    let stats = &season.quick_stats;
    if stats.count > 0 {
        println!(
            "  OPR:         auto {:.1} (#{}) / teleop {:.1} (#{}) / endgame {:.1} (#{}) / total {:.1} (#{} of {})",
            stats.auto.value,
            stats.auto.rank,
            stats.dc.value,
            stats.dc.rank,
            stats.eg.value,
            stats.eg.rank,
            stats.tot.value,
            stats.tot.rank,
            stats.count
        );
    }

    for event in &season.events {
        println!(
            "  {} ({} – {}): rank {} of {}, {} quals, {} playoffs",
            event.name,
            event.date_start,
            event.date_end,
            event.rank,
            event.teams,
            event.quals.len(),
            event.playoffs.len()
        );
    }

    let insight = format_insight(&season.ai_insight);
    if let Some(strength) = insight.strength {
        println!("  Strengths:   {strength}");
    }
    if let Some(weakness) = insight.weakness {
        println!("  Weaknesses:  {weakness}");
    }
    if let Some(score) = insight.score {
        println!("  AI score:    {score}");
    }
}

fn fake_mode() -> bool {
    env::var("FTC_FAKE")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn refresh_directory() -> bool {
    env::var("FTC_REFRESH_TEAMS")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
