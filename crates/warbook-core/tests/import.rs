// End-to-end import of the fixture exports into an in-memory database.

use std::path::PathBuf;

use warbook_core::{import_all, DataPaths, Database, PlayerFilter};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn fixture_paths() -> DataPaths {
    DataPaths {
        players: fixture("players.csv"),
        seasons: fixture("seasons.csv"),
    }
}

#[test]
fn import_fixture_feed() {
    let db = Database::open(":memory:").unwrap();
    let summary = import_all(&db, &fixture_paths()).unwrap();

    // The row with a non-numeric age is skipped.
    assert_eq!(summary.players, 4);
    // ghost99 has no player row; the NaN season never parses.
    assert_eq!(summary.seasons, 9);
    assert_eq!(summary.orphaned_seasons, 1);

    assert_eq!(db.player_count().unwrap(), 4);
    assert_eq!(db.season_count().unwrap(), 9);

    let okafor = db.player("okafc01").unwrap().unwrap();
    assert_eq!(okafor.games_played, None);
    let seasons = db.seasons_for_player("okafc01").unwrap();
    assert_eq!(seasons.len(), 3);
    assert_eq!(seasons[0].season, 2024);
    assert_eq!(seasons[0].secondary_metric, Some(74.0));
}

#[test]
fn reimport_is_idempotent() {
    let db = Database::open(":memory:").unwrap();
    import_all(&db, &fixture_paths()).unwrap();
    import_all(&db, &fixture_paths()).unwrap();

    assert_eq!(db.player_count().unwrap(), 4);
    assert_eq!(db.season_count().unwrap(), 9);
}

#[test]
fn filtered_query_after_import() {
    let db = Database::open(":memory:").unwrap();
    import_all(&db, &fixture_paths()).unwrap();

    let dh = db
        .players(&PlayerFilter {
            position: Some("dh".into()),
            team: None,
        })
        .unwrap();
    assert_eq!(dh.len(), 1);
    assert_eq!(dh[0].name, "Ben Moreno");
}

#[test]
fn missing_seasons_file_fails_with_context() {
    let db = Database::open(":memory:").unwrap();
    let paths = DataPaths {
        players: fixture("players.csv"),
        seasons: fixture("does_not_exist.csv"),
    };
    let err = import_all(&db, &paths).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load seasons"));
    // Nothing is written when either file is missing.
    assert_eq!(db.player_count().unwrap(), 0);
}
