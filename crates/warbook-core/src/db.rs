// SQLite persistence layer for players and their season history.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use warbook_valuation::{PlayerRecord, Role, SeasonRecord};

/// A player row as stored in the `players` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPlayer {
    /// Stats-feed identifier (e.g. `"troutmi01"`).
    pub id: String,
    pub name: String,
    pub team: String,
    pub age: Option<u32>,
    pub position: String,
    pub games_played: Option<u32>,
}

impl StoredPlayer {
    /// The subset of fields the valuation engine consumes.
    pub fn record(&self) -> PlayerRecord {
        PlayerRecord::new(self.age, self.position.clone(), self.games_played)
    }
}

/// Optional filters for [`Database::players`]. Empty filter returns everyone.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    /// Position match by parsed role, so "SS" also finds "shortstop".
    pub position: Option<String>,
    /// Case-insensitive team match.
    pub team: Option<String>,
}

impl PlayerFilter {
    /// Whether `player` plays the filtered position. Both sides go through
    /// `Role::from_str_pos`; a filter that names no known role falls back
    /// to a case-insensitive text match.
    pub fn matches_position(&self, player: &StoredPlayer) -> bool {
        let Some(wanted) = self.position.as_deref() else {
            return true;
        };
        match Role::from_str_pos(wanted) {
            Some(role) => player.record().role() == Some(role),
            None => player.position.trim().eq_ignore_ascii_case(wanted.trim()),
        }
    }
}

const UPSERT_PLAYER_SQL: &str = "
    INSERT INTO players (id, name, team, age, position, games_played)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(id) DO UPDATE SET
        name         = excluded.name,
        team         = excluded.team,
        age          = excluded.age,
        position     = excluded.position,
        games_played = excluded.games_played";

const UPSERT_SEASON_SQL: &str = "
    INSERT OR REPLACE INTO seasons
        (player_id, season, metric, games_played, secondary_metric)
    VALUES (?1, ?2, ?3, ?4, ?5)";

fn upsert_player_on(conn: &Connection, player: &StoredPlayer) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT_PLAYER_SQL,
        params![
            player.id,
            player.name,
            player.team,
            player.age,
            player.position,
            player.games_played
        ],
    )
}

fn upsert_season_on(
    conn: &Connection,
    player_id: &str,
    season: &SeasonRecord,
) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT_SEASON_SQL,
        params![
            player_id,
            season.season,
            season.metric,
            season.games_played,
            season.secondary_metric
        ],
    )
}

/// SQLite-backed persistence for the player table and the per-player,
/// per-season table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id           TEXT PRIMARY KEY,
                name         TEXT NOT NULL,
                team         TEXT NOT NULL DEFAULT '',
                age          INTEGER,
                position     TEXT NOT NULL DEFAULT '',
                games_played INTEGER
            );

            CREATE TABLE IF NOT EXISTS seasons (
                player_id        TEXT NOT NULL REFERENCES players(id),
                season           INTEGER NOT NULL,
                metric           REAL NOT NULL,
                games_played     INTEGER,
                secondary_metric REAL,
                PRIMARY KEY (player_id, season)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. A poisoned lock still guards a
    /// usable connection, so it is recovered rather than propagated.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a player or overwrite the stored row with the same id.
    pub fn upsert_player(&self, player: &StoredPlayer) -> Result<()> {
        upsert_player_on(&self.conn(), player)
            .with_context(|| format!("failed to upsert player {}", player.id))?;
        Ok(())
    }

    /// Insert a season or overwrite the stored `(player_id, season)` row.
    /// The player must already exist.
    pub fn upsert_season(&self, player_id: &str, season: &SeasonRecord) -> Result<()> {
        upsert_season_on(&self.conn(), player_id, season)
            .with_context(|| format!("failed to upsert season {} for {player_id}", season.season))?;
        Ok(())
    }

    /// Import players and seasons in a single transaction. Seasons whose
    /// player is neither in `players` nor already stored are rejected by the
    /// foreign key, so callers filter them out first.
    pub fn import_batch(
        &self,
        players: &[StoredPlayer],
        seasons: &[(String, SeasonRecord)],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin import transaction")?;

        for player in players {
            upsert_player_on(&tx, player)
                .with_context(|| format!("failed to upsert player {} in batch", player.id))?;
        }

        for (player_id, season) in seasons {
            upsert_season_on(&tx, player_id, season).with_context(|| {
                format!("failed to upsert season {} for {player_id} in batch", season.season)
            })?;
        }

        tx.commit().context("failed to commit import")?;
        Ok(())
    }

    /// Look up one player by id.
    pub fn player(&self, id: &str) -> Result<Option<StoredPlayer>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, team, age, position, games_played
             FROM players WHERE id = ?1",
            params![id],
            player_from_row,
        )
        .optional()
        .with_context(|| format!("failed to load player {id}"))
    }

    /// All players matching `filter`, ordered by id. Team is matched in SQL;
    /// position is matched by role, see [`PlayerFilter::matches_position`].
    pub fn players(&self, filter: &PlayerFilter) -> Result<Vec<StoredPlayer>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, team, age, position, games_played
                 FROM players
                 WHERE (?1 IS NULL OR team = ?1 COLLATE NOCASE)
                 ORDER BY id",
            )
            .context("failed to prepare players query")?;

        let rows = stmt
            .query_map(params![filter.team.as_deref()], player_from_row)
            .context("failed to query players")?;

        let players = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read player rows")?;
        Ok(players
            .into_iter()
            .filter(|p| filter.matches_position(p))
            .collect())
    }

    /// Every stored season for one player, most recent first.
    pub fn seasons_for_player(&self, player_id: &str) -> Result<Vec<SeasonRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT season, metric, games_played, secondary_metric
                 FROM seasons WHERE player_id = ?1
                 ORDER BY season DESC",
            )
            .context("failed to prepare seasons query")?;

        let rows = stmt
            .query_map(params![player_id], season_from_row)
            .context("failed to query seasons")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read seasons for {player_id}"))
    }

    /// Every stored season grouped by player id, for batch passes.
    pub fn all_seasons(&self) -> Result<HashMap<String, Vec<SeasonRecord>>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_id, season, metric, games_played, secondary_metric
                 FROM seasons ORDER BY player_id, season DESC",
            )
            .context("failed to prepare all-seasons query")?;

        let rows = stmt
            .query_map([], |row| {
                let player_id: String = row.get(0)?;
                let season = SeasonRecord {
                    season: row.get(1)?,
                    metric: row.get(2)?,
                    games_played: row.get(3)?,
                    secondary_metric: row.get(4)?,
                };
                Ok((player_id, season))
            })
            .context("failed to query all seasons")?;

        let mut grouped: HashMap<String, Vec<SeasonRecord>> = HashMap::new();
        for row in rows {
            let (player_id, season) = row.context("failed to read season row")?;
            grouped.entry(player_id).or_default().push(season);
        }
        Ok(grouped)
    }

    pub fn player_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .context("failed to count players")?;
        Ok(count as usize)
    }

    pub fn season_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM seasons", [], |row| row.get(0))
            .context("failed to count seasons")?;
        Ok(count as usize)
    }

    /// Ids of every stored player.
    pub fn player_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id FROM players ORDER BY id")
            .context("failed to prepare player id query")?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .context("failed to query player ids")?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .context("failed to read player ids")
    }
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<StoredPlayer> {
    Ok(StoredPlayer {
        id: row.get(0)?,
        name: row.get(1)?,
        team: row.get(2)?,
        age: row.get(3)?,
        position: row.get(4)?,
        games_played: row.get(5)?,
    })
}

fn season_from_row(row: &Row<'_>) -> rusqlite::Result<SeasonRecord> {
    Ok(SeasonRecord {
        season: row.get(0)?,
        metric: row.get(1)?,
        games_played: row.get(2)?,
        secondary_metric: row.get(3)?,
    })
}
