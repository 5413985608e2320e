use anyhow::Result;

use crate::model::TeamMap;
use crate::scout_api::TeamDirectorySource;
use crate::store::Store;

/// Loads the team-number -> name directory once per session: the stored
/// copy wins unless a refresh is forced, and a fresh fetch is persisted for
/// the next session (best effort).
pub fn load_team_map<S: TeamDirectorySource>(
    store: &Store,
    source: &S,
    force_refresh: bool,
) -> Result<TeamMap> {
    if !force_refresh {
        if let Ok(Some(map)) = store.load_team_directory() {
            if !map.is_empty() {
                return Ok(map);
            }
        }
    }

    let teams = source.team_search()?;
    let _ = store.save_team_directory(&teams);
    Ok(teams.into_iter().map(|t| (t.number, t.name)).collect())
}
