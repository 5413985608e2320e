use ftc_master::coordinator::{LoadState, TeamLoader};
use ftc_master::fake_source::{FAKE_TEAM, FakeSource};
use ftc_master::model::{CURRENT_VERSION, LUCK_SENTINEL, Team, TeamMap};
use ftc_master::store::Store;
use ftc_master::team_directory::load_team_map;

fn seeded_team_map(store: &Store, fake: &FakeSource) -> TeamMap {
    load_team_map(store, fake, false).expect("directory should load")
}

#[test]
fn fresh_lookup_runs_both_phases_and_persists() {
    let store = Store::open_in_memory().expect("in-memory store");
    let fake = FakeSource::seeded();
    let team_map = seeded_team_map(&store, &fake);

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);

    assert_eq!(loader.state, LoadState::Complete);
    assert!(loader.errors.is_empty(), "errors: {:?}", loader.errors);

    let team = loader.team.as_ref().expect("team loaded");
    assert_eq!(team.name, "Voltage Vipers");
    assert_eq!(team.version, CURRENT_VERSION);
    let season = team.current_season().expect("season present");
    assert_eq!(season.luck_score, "-18.50");
    assert_ne!(season.ai_insight, "No insights available.");

    // The finished record is persisted, extension fields included.
    let saved = store
        .find_team(FAKE_TEAM)
        .expect("store read")
        .expect("record persisted");
    assert_eq!(saved, *team);
    assert_eq!(fake.insight_calls(), 1);
}

#[test]
fn fresh_record_is_served_without_any_fetches() {
    let store = Store::open_in_memory().expect("in-memory store");
    let warm = FakeSource::seeded();
    let team_map = seeded_team_map(&store, &warm);
    let mut loader = TeamLoader::new(&store, &warm, &warm, &warm, &warm, &team_map);
    loader.load(FAKE_TEAM);
    assert_eq!(loader.state, LoadState::Complete);

    // Same store, untouched source: everything must come from the record.
    let cold = FakeSource::seeded();
    let mut loader = TeamLoader::new(&store, &cold, &cold, &cold, &cold, &team_map);
    loader.load(FAKE_TEAM);

    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(cold.total_adapter_calls(), 0);
    assert_eq!(
        loader.team.as_ref().expect("team loaded").current_season().expect("season").luck_score,
        "-18.50"
    );
}

#[test]
fn version_bump_forces_one_recompute() {
    let store = Store::open_in_memory().expect("in-memory store");
    let fake = FakeSource::seeded();
    let team_map = seeded_team_map(&store, &fake);

    // A record written by an older pipeline revision.
    let mut stale = Team::new(FAKE_TEAM, "Voltage Vipers".to_string(), Default::default());
    stale.version = CURRENT_VERSION - 1;
    store.upsert_team(&stale).expect("seed stale record");

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);
    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(fake.event_list_fetches(), 1);
    assert_eq!(
        store
            .find_team(FAKE_TEAM)
            .expect("store read")
            .expect("record present")
            .version,
        CURRENT_VERSION
    );

    // The recompute healed the record; the next lookup is all cache.
    loader.load(FAKE_TEAM);
    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(fake.event_list_fetches(), 1);
}

#[test]
fn shared_event_rankings_fetched_once_across_teams() {
    let store = Store::open_in_memory().expect("in-memory store");
    let fake = FakeSource::seeded();
    let team_map = seeded_team_map(&store, &fake);

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);
    assert_eq!(fake.ranking_fetches(), 2);

    // An alliance partner at the same two events.
    loader.load(1111);
    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(fake.ranking_fetches(), 2);
}

#[test]
fn event_list_outage_surfaces_error_without_caching() {
    let store = Store::open_in_memory().expect("in-memory store");
    let mut fake = FakeSource::seeded();
    fake.fail.events = true;
    let team_map = seeded_team_map(&store, &fake);

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);

    assert!(matches!(loader.state, LoadState::Error(_)));
    // The partial record stays visible for display.
    let team = loader.team.as_ref().expect("stub team present");
    assert_eq!(team.current_season().expect("season").location, "Brooklyn, NY, USA");
    // But it is never persisted; the outage must not look like a cache hit.
    assert!(store.find_team(FAKE_TEAM).expect("store read").is_none());

    // Retry against a healthy source succeeds from scratch.
    let healthy = FakeSource::seeded();
    let mut loader = TeamLoader::new(&store, &healthy, &healthy, &healthy, &healthy, &team_map);
    loader.retry(FAKE_TEAM);
    assert_eq!(loader.state, LoadState::Complete);
    assert!(store.find_team(FAKE_TEAM).expect("store read").is_some());
}

#[test]
fn failed_extension_keeps_core_and_retries_extension_only() {
    let store = Store::open_in_memory().expect("in-memory store");
    let mut fake = FakeSource::seeded();
    fake.fail.graph = true;
    fake.fail.insight = true;
    let team_map = seeded_team_map(&store, &fake);

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);
    assert!(matches!(loader.state, LoadState::Error(_)));

    // The core record landed with the sentinel still in place.
    let saved = store
        .find_team(FAKE_TEAM)
        .expect("store read")
        .expect("core record persisted");
    assert_eq!(saved.current_season().expect("season").luck_score, LUCK_SENTINEL);

    // Next lookup reuses the core and re-runs only the extension.
    let healthy = FakeSource::seeded();
    let mut loader = TeamLoader::new(&store, &healthy, &healthy, &healthy, &healthy, &team_map);
    loader.load(FAKE_TEAM);
    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(healthy.event_list_fetches(), 0);
    assert_eq!(healthy.match_fetches(), 0);
    assert_eq!(healthy.graph_fetches(), 1);
    assert_eq!(healthy.insight_calls(), 1);
    let season_luck = store
        .find_team(FAKE_TEAM)
        .expect("store read")
        .expect("record present")
        .current_season()
        .expect("season")
        .luck_score
        .clone();
    assert_eq!(season_luck, "-18.50");
}

#[test]
fn eventless_team_completes_without_extension() {
    let store = Store::open_in_memory().expect("in-memory store");
    let mut fake = FakeSource::seeded();
    fake.events.clear();
    let team_map = seeded_team_map(&store, &fake);

    let mut loader = TeamLoader::new(&store, &fake, &fake, &fake, &fake, &team_map);
    loader.load(FAKE_TEAM);

    assert_eq!(loader.state, LoadState::Complete);
    assert_eq!(fake.graph_fetches(), 0);
    assert_eq!(fake.insight_calls(), 0);
    let team = loader.team.as_ref().expect("team loaded");
    let season = team.current_season().expect("season present");
    assert!(season.events.is_empty());
    assert_eq!(season.luck_score, LUCK_SENTINEL);
}

#[test]
fn directory_is_loaded_once_and_reused_from_store() {
    let store = Store::open_in_memory().expect("in-memory store");
    let fake = FakeSource::seeded();

    let first = load_team_map(&store, &fake, false).expect("directory should load");
    assert_eq!(first.get(&FAKE_TEAM).map(String::as_str), Some("Voltage Vipers"));
    assert_eq!(fake.directory_fetches(), 1);

    // Second session: the stored copy wins.
    let second = load_team_map(&store, &fake, false).expect("directory should load");
    assert_eq!(second, first);
    assert_eq!(fake.directory_fetches(), 1);

    // A forced refresh goes back upstream.
    load_team_map(&store, &fake, true).expect("directory should load");
    assert_eq!(fake.directory_fetches(), 2);
}
