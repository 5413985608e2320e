use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::model::{EventRanking, Team, TeamMap, TeamRef};

const STORE_DIR: &str = "ftc_master";
const STORE_FILE: &str = "teams.sqlite";

/// Local document store. Records are whole JSON documents keyed by team
/// number (teams) or event code (event ranking snapshots); the version is
/// duplicated into its own column for cheap freshness checks. Writes are
/// full-document upserts, so concurrent writers get last-writer-wins at
/// the key granularity.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_default() -> Result<Self> {
        let path = default_db_path().context("unable to resolve store path")?;
        Self::open(&path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn find_team(&self, number: u32) -> Result<Option<Team>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc FROM teams WHERE number = ?1",
                params![number],
                |row| row.get(0),
            )
            .optional()
            .context("query team")?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        let team = serde_json::from_str(&doc).context("decode team doc")?;
        Ok(Some(team))
    }

    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        let doc = serde_json::to_string(team).context("encode team doc")?;
        self.conn
            .execute(
                "INSERT INTO teams (number, version, doc, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(number) DO UPDATE SET
                     version = excluded.version,
                     doc = excluded.doc,
                     updated_at = excluded.updated_at",
                params![team.number, team.version, doc, now()],
            )
            .context("upsert team")?;
        Ok(())
    }

    pub fn delete_team(&self, number: u32) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE number = ?1", params![number])
            .context("delete team")?;
        Ok(changed > 0)
    }

    pub fn all_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT doc FROM teams ORDER BY number")
            .context("prepare team listing")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("list teams")?;
        let mut teams = Vec::new();
        for doc in rows {
            let doc = doc.context("read team row")?;
            teams.push(serde_json::from_str(&doc).context("decode team doc")?);
        }
        Ok(teams)
    }

    pub fn find_event_ranking(&self, event_code: &str) -> Result<Option<EventRanking>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc FROM event_ranks WHERE event_code = ?1",
                params![event_code],
                |row| row.get(0),
            )
            .optional()
            .context("query event ranking")?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        let ranking = serde_json::from_str(&doc).context("decode event ranking doc")?;
        Ok(Some(ranking))
    }

    pub fn upsert_event_ranking(&self, ranking: &EventRanking) -> Result<()> {
        let doc = serde_json::to_string(ranking).context("encode event ranking doc")?;
        self.conn
            .execute(
                "INSERT INTO event_ranks (event_code, version, doc, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(event_code) DO UPDATE SET
                     version = excluded.version,
                     doc = excluded.doc,
                     updated_at = excluded.updated_at",
                params![ranking.event_code, ranking.version, doc, now()],
            )
            .context("upsert event ranking")?;
        Ok(())
    }

    pub fn delete_event_ranking(&self, event_code: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM event_ranks WHERE event_code = ?1",
                params![event_code],
            )
            .context("delete event ranking")?;
        Ok(changed > 0)
    }

    pub fn load_team_directory(&self) -> Result<Option<TeamMap>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc FROM team_directory WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("query team directory")?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        let teams: Vec<TeamRef> =
            serde_json::from_str(&doc).context("decode team directory doc")?;
        Ok(Some(
            teams.into_iter().map(|t| (t.number, t.name)).collect(),
        ))
    }

    pub fn save_team_directory(&self, teams: &[TeamRef]) -> Result<()> {
        let doc = serde_json::to_string(teams).context("encode team directory doc")?;
        self.conn
            .execute(
                "INSERT INTO team_directory (id, doc, updated_at)
                 VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET
                     doc = excluded.doc,
                     updated_at = excluded.updated_at",
                params![doc, now()],
            )
            .context("save team directory")?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS teams (
            number INTEGER PRIMARY KEY,
            version INTEGER NOT NULL,
            doc TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS event_ranks (
            event_code TEXT PRIMARY KEY,
            version INTEGER NOT NULL,
            doc TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS team_directory (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            doc TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("init store schema")?;
    Ok(())
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(STORE_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(STORE_DIR))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
