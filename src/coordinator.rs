use crate::events_api::OfficialEvents;
use crate::insight::InsightGenerator;
use crate::model::{CURRENT_VERSION, LUCK_SENTINEL, Team, TeamMap, team_name};
use crate::reconcile::{reconcile_core, reconcile_extension};
use crate::scout_api::{MatchGraphSource, QuickStatsSource};
use crate::store::Store;

/// Per-lookup lifecycle. The core phase is cheap and yields everything a
/// consumer needs to render; the extension phase (graph traversal plus
/// insight generation) is slow and runs after the record is already usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    CoreFetching,
    CoreReady,
    ExtensionFetching,
    Complete,
    Error(String),
}

/// Drives the two-phase refresh for one team number: reuse the persisted
/// record when its version matches, recompute otherwise, then run the
/// extension pass only while the luck score is still the sentinel.
pub struct TeamLoader<'a, O, Q, G, I> {
    store: &'a Store,
    official: &'a O,
    quick: &'a Q,
    graph: &'a G,
    insight: &'a I,
    team_map: &'a TeamMap,
    pub state: LoadState,
    pub team: Option<Team>,
    pub errors: Vec<String>,
}

impl<'a, O, Q, G, I> TeamLoader<'a, O, Q, G, I>
where
    O: OfficialEvents + Sync,
    Q: QuickStatsSource,
    G: MatchGraphSource,
    I: InsightGenerator,
{
    pub fn new(
        store: &'a Store,
        official: &'a O,
        quick: &'a Q,
        graph: &'a G,
        insight: &'a I,
        team_map: &'a TeamMap,
    ) -> Self {
        Self {
            store,
            official,
            quick,
            graph,
            insight,
            team_map,
            state: LoadState::Idle,
            team: None,
            errors: Vec::new(),
        }
    }

    pub fn load(&mut self, team_number: u32) {
        self.team = None;
        self.errors.clear();
        self.run(team_number);
    }

    /// Re-enters the pipeline from scratch after an error.
    pub fn retry(&mut self, team_number: u32) {
        self.load(team_number);
    }

    fn run(&mut self, team_number: u32) {
        self.state = LoadState::CoreFetching;

        // A store read failure is treated as a miss: recomputing is always
        // safe, and the next successful write heals the record.
        let saved = match self.store.find_team(team_number) {
            Ok(saved) => saved,
            Err(err) => {
                self.errors.push(format!("store read failed: {err}"));
                None
            }
        };

        match saved {
            Some(saved) if saved.version == CURRENT_VERSION => {
                self.team = Some(saved);
                self.state = LoadState::CoreReady;
            }
            _ => {
                let core = reconcile_core(
                    self.store,
                    self.official,
                    self.quick,
                    team_number,
                    self.team_map,
                );
                self.errors.extend(core.errors);
                let team = Team::new(
                    team_number,
                    team_name(self.team_map, team_number),
                    core.season,
                );
                if let Some(message) = core.fatal {
                    // Keep the stub visible for display but never cache it:
                    // a persisted empty record would mask the outage until
                    // the next version bump.
                    self.team = Some(team);
                    self.state = LoadState::Error(message);
                    return;
                }
                if let Err(err) = self.store.upsert_team(&team) {
                    self.errors.push(format!("store write failed: {err}"));
                }
                self.team = Some(team);
                self.state = LoadState::CoreReady;
            }
        }

        self.run_extension(team_number);
    }

    fn run_extension(&mut self, team_number: u32) {
        let Some(team) = self.team.as_ref() else {
            self.state = LoadState::Error("no team record after core phase".to_string());
            return;
        };
        let Some(season) = team.current_season() else {
            self.state = LoadState::Error("team record has no seasons".to_string());
            return;
        };

        if season.events.is_empty() {
            self.state = LoadState::Complete;
            return;
        }
        if season.luck_score != LUCK_SENTINEL {
            self.state = LoadState::Complete;
            return;
        }

        self.state = LoadState::ExtensionFetching;
        let pass = reconcile_extension(self.graph, self.insight, team_number, team);
        self.errors.extend(pass.errors);

        if pass.skipped {
            self.state = LoadState::Complete;
            return;
        }
        if pass.update.is_empty() {
            let message = self
                .errors
                .last()
                .cloned()
                .unwrap_or_else(|| "extension pass produced no data".to_string());
            self.state = LoadState::Error(message);
            return;
        }

        if let Some(team) = self.team.as_mut() {
            pass.update.apply(team);
            if let Err(err) = self.store.upsert_team(team) {
                self.errors.push(format!("store write failed: {err}"));
            }
        }
        self.state = LoadState::Complete;
    }
}
