// Stats-feed CSV import.
//
// Two files: a players export (one row per player) and a seasons export (one
// row per player per season). Malformed rows are skipped with a warning so a
// single bad line never blocks the rest of the feed.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use warbook_valuation::SeasonRecord;

use crate::config::DataPaths;
use crate::db::{Database, StoredPlayer};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub players: usize,
    pub seasons: usize,
    /// Season rows whose player id is unknown.
    pub orphaned_seasons: usize,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// `player_id,name,team,age,position,games`. Empty cells deserialize to
/// `None`; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayer {
    player_id: String,
    name: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    position: String,
    #[serde(default, alias = "games_played")]
    games: Option<u32>,
}

/// `player_id,season,war,games,power_score`.
#[derive(Debug, Deserialize)]
struct RawSeason {
    player_id: String,
    season: i32,
    #[serde(alias = "metric")]
    war: f64,
    #[serde(default, alias = "games_played")]
    games: Option<u32>,
    #[serde(default)]
    power_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr)
}

pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<StoredPlayer>, csv::Error> {
    let mut reader = csv_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                if raw.player_id.is_empty() {
                    warn!("skipping player '{}': empty player_id", raw.name);
                    continue;
                }
                players.push(StoredPlayer {
                    id: raw.player_id,
                    name: raw.name,
                    team: raw.team,
                    age: raw.age,
                    position: raw.position,
                    games_played: raw.games,
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

pub fn load_seasons_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<(String, SeasonRecord)>, csv::Error> {
    let mut reader = csv_reader(rdr);
    let mut seasons = Vec::new();
    for result in reader.deserialize::<RawSeason>() {
        match result {
            Ok(raw) => {
                if raw.player_id.is_empty() {
                    warn!("skipping season {}: empty player_id", raw.season);
                    continue;
                }
                if !raw.war.is_finite() {
                    warn!(
                        "skipping season {} for '{}': non-finite war value",
                        raw.season, raw.player_id
                    );
                    continue;
                }
                let power_score = match raw.power_score {
                    Some(v) if !v.is_finite() => {
                        warn!(
                            "dropping non-finite power_score for '{}' in {}",
                            raw.player_id, raw.season
                        );
                        None
                    }
                    other => other,
                };
                let record = SeasonRecord {
                    season: raw.season,
                    metric: raw.war,
                    games_played: raw.games,
                    secondary_metric: power_score,
                };
                seasons.push((raw.player_id, record));
            }
            Err(e) => {
                warn!("skipping malformed season row: {}", e);
            }
        }
    }
    Ok(seasons)
}

// ---------------------------------------------------------------------------
// Path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ImportError> {
    std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the players export.
pub fn load_players(path: &Path) -> Result<Vec<StoredPlayer>, ImportError> {
    load_players_from_reader(open(path)?).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the seasons export as `(player_id, season)` pairs.
pub fn load_seasons(path: &Path) -> Result<Vec<(String, SeasonRecord)>, ImportError> {
    load_seasons_from_reader(open(path)?).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Import into the database
// ---------------------------------------------------------------------------

/// Write already-parsed rows to `db` in one transaction. Seasons for players
/// that are neither in `players` nor already stored are dropped.
pub fn import_rows(
    db: &Database,
    players: Vec<StoredPlayer>,
    seasons: Vec<(String, SeasonRecord)>,
) -> anyhow::Result<ImportSummary> {
    let mut known: HashSet<String> = db.player_ids()?.into_iter().collect();
    known.extend(players.iter().map(|p| p.id.clone()));

    let total_seasons = seasons.len();
    let seasons: Vec<(String, SeasonRecord)> = seasons
        .into_iter()
        .filter(|(player_id, season)| {
            let keep = known.contains(player_id);
            if !keep {
                warn!(
                    "skipping season {} for unknown player '{}'",
                    season.season, player_id
                );
            }
            keep
        })
        .collect();

    db.import_batch(&players, &seasons)?;

    Ok(ImportSummary {
        players: players.len(),
        seasons: seasons.len(),
        orphaned_seasons: total_seasons - seasons.len(),
    })
}

/// Import both exports named in the config.
pub fn import_all(db: &Database, paths: &DataPaths) -> anyhow::Result<ImportSummary> {
    let players = load_players(Path::new(&paths.players)).context("failed to load players")?;
    let seasons = load_seasons(Path::new(&paths.seasons)).context("failed to load seasons")?;

    let summary = import_rows(db, players, seasons)?;
    info!(
        "imported {} players and {} seasons ({} orphaned seasons skipped)",
        summary.players, summary.seasons, summary.orphaned_seasons
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Players --

    #[test]
    fn players_csv_parses_optional_cells() {
        let csv = "player_id,name,team,age,position,games\n\
                   a1,Ava Ruiz,NYY,27,SS,150\n\
                   b2,Ben Cole,,,DH,\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].id, "a1");
        assert_eq!(players[0].age, Some(27));
        assert_eq!(players[0].games_played, Some(150));
        assert_eq!(players[1].team, "");
        assert_eq!(players[1].age, None);
        assert_eq!(players[1].games_played, None);
    }

    #[test]
    fn player_fields_are_trimmed() {
        let csv = "player_id,name,team,age,position,games\n  a1 , Ava Ruiz ,NYY, 27 ,SS,150\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players[0].id, "a1");
        assert_eq!(players[0].name, "Ava Ruiz");
        assert_eq!(players[0].age, Some(27));
    }

    #[test]
    fn malformed_player_rows_skipped() {
        let csv = "player_id,name,team,age,position,games\n\
                   a1,Ava Ruiz,NYY,twenty,SS,150\n\
                   ,No Id,NYY,30,C,100\n\
                   c3,Cal Moss,BOS,31,C,120\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, "c3");
    }

    #[test]
    fn extra_player_columns_ignored() {
        let csv = "player_id,name,team,age,position,games,bats\n\
                   a1,Ava Ruiz,NYY,27,SS,150,R\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
    }

    // -- Seasons --

    #[test]
    fn seasons_csv_parses_optional_cells() {
        let csv = "player_id,season,war,games,power_score\n\
                   a1,2023,4.2,150,82.5\n\
                   a1,2024,5.0,,\n";
        let seasons = load_seasons_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(seasons.len(), 2);
        let (id, first) = &seasons[0];
        assert_eq!(id, "a1");
        assert_eq!(first.metric, 4.2);
        assert_eq!(first.secondary_metric, Some(82.5));
        assert_eq!(seasons[1].1.games_played, None);
        assert_eq!(seasons[1].1.secondary_metric, None);
    }

    #[test]
    fn non_finite_war_skipped() {
        let csv = "player_id,season,war,games,power_score\n\
                   a1,2023,NaN,150,\n\
                   a1,2024,inf,150,\n\
                   a1,2022,1.5,150,\n";
        let seasons = load_seasons_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].1.season, 2022);
    }

    #[test]
    fn non_finite_power_score_dropped_not_row() {
        let csv = "player_id,season,war,games,power_score\na1,2024,3.0,140,NaN\n";
        let seasons = load_seasons_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].1.secondary_metric, None);
    }

    #[test]
    fn malformed_season_rows_skipped() {
        let csv = "player_id,season,war,games,power_score\n\
                   a1,last year,3.0,140,\n\
                   a1,2024,,140,\n\
                   a1,2023,2.0,140,\n";
        let seasons = load_seasons_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].1.season, 2023);
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let csv = "player_id,season,war,games,power_score\n";
        assert!(load_seasons_from_reader(csv.as_bytes()).unwrap().is_empty());
    }

    // -- Import --

    #[test]
    fn import_rows_skips_orphaned_seasons() {
        let db = Database::open(":memory:").unwrap();
        let players = load_players_from_reader(
            "player_id,name,team,age,position,games\na1,Ava Ruiz,NYY,27,SS,150\n".as_bytes(),
        )
        .unwrap();
        let seasons = load_seasons_from_reader(
            "player_id,season,war,games,power_score\n\
             a1,2024,5.0,150,\n\
             zz,2024,9.0,150,\n"
                .as_bytes(),
        )
        .unwrap();

        let summary = import_rows(&db, players, seasons).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                players: 1,
                seasons: 1,
                orphaned_seasons: 1
            }
        );
        assert_eq!(db.season_count().unwrap(), 1);
    }

    #[test]
    fn seasons_for_previously_stored_player_are_kept() {
        let db = Database::open(":memory:").unwrap();
        import_rows(
            &db,
            load_players_from_reader(
                "player_id,name,team,age,position,games\na1,Ava Ruiz,NYY,27,SS,150\n".as_bytes(),
            )
            .unwrap(),
            vec![],
        )
        .unwrap();

        let summary = import_rows(
            &db,
            vec![],
            vec![("a1".to_string(), SeasonRecord::new(2024, 4.0, Some(150)))],
        )
        .unwrap();
        assert_eq!(summary.seasons, 1);
        assert_eq!(summary.orphaned_seasons, 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        match load_players(Path::new("/nonexistent/warbook/players.csv")).unwrap_err() {
            ImportError::Io { path, .. } => assert!(path.ends_with("players.csv")),
            other => panic!("expected Io error, got: {other}"),
        }
    }
}
