use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use ftc_master::analysis::team_role_prediction;
use ftc_master::fake_source::{FAKE_TEAM, FakeSource};
use ftc_master::reconcile::{luck_from_graph, reconcile_core};
use ftc_master::scout_api::parse_match_graph_json;
use ftc_master::store::Store;
use ftc_master::team_directory::load_team_map;

const GRAPH_JSON: &str = include_str!("../tests/fixtures/match_graph.json");
const MATCHES_JSON: &str = include_str!("../tests/fixtures/event_matches.json");

fn bench_role_prediction(c: &mut Criterion) {
    let samples: Vec<i64> = (0..60).map(|i| 30 + (i * 7) % 50).collect();
    let specimens: Vec<i64> = (0..60).map(|i| 20 + (i * 11) % 40).collect();
    c.bench_function("role_prediction", |b| {
        b.iter(|| {
            let role = team_role_prediction(black_box(&specimens), black_box(&samples));
            black_box(role.percent_samples.len());
        })
    });
}

fn bench_match_parse(c: &mut Criterion) {
    c.bench_function("event_matches_parse", |b| {
        b.iter(|| {
            let matches =
                ftc_master::events_api::parse_event_matches_json(black_box(MATCHES_JSON)).unwrap();
            black_box(matches.len());
        })
    });
}

fn bench_luck_from_graph(c: &mut Criterion) {
    let graph = parse_match_graph_json(GRAPH_JSON)
        .expect("valid fixture json")
        .expect("fixture has a team");
    c.bench_function("luck_from_graph", |b| {
        b.iter(|| black_box(luck_from_graph(black_box(&graph))))
    });
}

fn bench_core_reconcile(c: &mut Criterion) {
    let store = Store::open_in_memory().expect("in-memory store");
    let fake = FakeSource::seeded();
    let team_map = load_team_map(&store, &fake, false).expect("directory should load");
    c.bench_function("core_reconcile_seeded", |b| {
        b.iter(|| {
            let core = reconcile_core(&store, &fake, &fake, black_box(FAKE_TEAM), &team_map);
            black_box(core.season.win);
        })
    });
}

criterion_group!(
    benches,
    bench_role_prediction,
    bench_match_parse,
    bench_luck_from_graph,
    bench_core_reconcile
);
criterion_main!(benches);
