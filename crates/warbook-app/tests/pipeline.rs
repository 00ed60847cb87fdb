// Full batch run: CSV fixtures -> SQLite -> valuations -> report.

use std::path::PathBuf;

use chrono::Utc;
use warbook_app::{build_report, valuate_all, write_report, RankedEntry};
use warbook_core::{import_all, DataPaths, Database, PlayerFilter};
use warbook_valuation::ValuationParams;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn imported_db() -> Database {
    let db = Database::open(":memory:").unwrap();
    let paths = DataPaths {
        players: fixture("players.csv"),
        seasons: fixture("seasons.csv"),
    };
    import_all(&db, &paths).unwrap();
    db
}

fn find<'a>(entries: &'a [RankedEntry], id: &str) -> &'a RankedEntry {
    entries
        .iter()
        .find(|e| e.player_id == id)
        .unwrap_or_else(|| panic!("{id} missing from ranking"))
}

#[test]
fn every_player_is_ranked_once() {
    let entries = valuate_all(
        &imported_db(),
        &PlayerFilter::default(),
        &ValuationParams::default(),
    )
    .unwrap();

    assert_eq!(entries.len(), 6);
    let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, (1..=6).collect::<Vec<_>>());
    for e in &entries {
        assert!((0.0..=100.0).contains(&e.index));
        assert!(e.dollar_value >= 0.0);
    }
}

#[test]
fn ranking_reflects_reference_profiles() {
    let entries = valuate_all(
        &imported_db(),
        &PlayerFilter::default(),
        &ValuationParams::default(),
    )
    .unwrap();

    let ruiz = find(&entries, "ruiza01");
    let moreno = find(&entries, "moreb01");
    let pratt = find(&entries, "pratn01");

    // Prime-age shortstop with an elite season sits near the top of the scale.
    assert!(ruiz.index > 50.0);
    // Aging part-time DH lands near the bottom.
    assert!(moreno.index < 10.0);
    assert!(moreno.rank > ruiz.rank);
    // No seasons at all: listed, valued at zero, ranked last.
    assert_eq!(pratt.seasons, 0);
    assert_eq!(pratt.dollar_value, 0.0);
    assert_eq!(pratt.rank, 6);
}

#[test]
fn spike_season_is_discounted_against_history() {
    let entries = valuate_all(
        &imported_db(),
        &PlayerFilter {
            position: Some("CF".into()),
            team: Some("SEA".into()),
        },
        &ValuationParams::default(),
    )
    .unwrap();

    assert_eq!(entries.len(), 2);
    let wells = find(&entries, "wellj01");
    // Trailing 5.0 plus a partially credited jump, well short of 9.
    assert!(wells.breakdown.blended_metric < 9.0);
    assert!(wells.breakdown.blended_metric > 5.0);
}

#[test]
fn report_pages_through_ranking() {
    let entries = valuate_all(
        &imported_db(),
        &PlayerFilter::default(),
        &ValuationParams::default(),
    )
    .unwrap();

    let first = build_report(&entries, 1, 4, Utc::now());
    let second = build_report(&entries, 2, 4, Utc::now());
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.entries.len(), 4);
    assert_eq!(second.entries.len(), 2);
    assert_eq!(second.entries[0].rank, 5);

    let tmp = std::env::temp_dir().join("warbook_pipeline_report");
    let _ = std::fs::remove_dir_all(&tmp);
    let path = tmp.join("valuations.json");
    write_report(&second, &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["total_players"], 6);
    assert_eq!(json["page"], 2);
    assert_eq!(json["entries"][1]["rank"], 6);
    assert_eq!(json["entries"][1]["player_id"], "pratn01");

    let _ = std::fs::remove_dir_all(&tmp);
}
