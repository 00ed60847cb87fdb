// Batch valuation pass over every stored player.

use std::cmp::Ordering;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use warbook_core::{Database, PlayerFilter, StoredPlayer};
use warbook_valuation::{valuate_with, Breakdown, SeasonRecord, ValuationParams, ValuationResult};

/// One row of the ranked valuation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position after sorting by dollar value.
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub age: Option<u32>,
    /// Number of seasons the valuation was built from.
    pub seasons: usize,
    pub index: f64,
    pub dollar_value: f64,
    pub breakdown: Breakdown,
}

/// Value a single stored player against its season rows.
pub fn valuate_player(
    player: &StoredPlayer,
    seasons: &[SeasonRecord],
    params: &ValuationParams,
) -> ValuationResult {
    let result = valuate_with(&player.record(), seasons, params);
    debug!(
        "{} ({}): index={:.1} dollars={:.0}",
        player.name, player.id, result.index, result.dollar_value
    );
    result
}

/// Order two valuations: higher dollars first, then higher index, then id.
fn compare(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.dollar_value
        .total_cmp(&a.dollar_value)
        .then_with(|| b.index.total_cmp(&a.index))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// Sort entries in place and assign 1-based ranks.
pub fn rank_entries(entries: &mut [RankedEntry]) {
    entries.sort_by(compare);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
}

/// Value every player matching `filter` and return them ranked.
pub fn valuate_all(
    db: &Database,
    filter: &PlayerFilter,
    params: &ValuationParams,
) -> Result<Vec<RankedEntry>> {
    let players = db.players(filter).context("failed to load players")?;
    let mut seasons = db.all_seasons().context("failed to load seasons")?;

    let mut entries: Vec<RankedEntry> = players
        .into_iter()
        .map(|player| {
            let history = seasons.remove(&player.id).unwrap_or_default();
            let result = valuate_player(&player, &history, params);
            RankedEntry {
                rank: 0,
                seasons: history.len(),
                player_id: player.id,
                name: player.name,
                team: player.team,
                position: player.position,
                age: player.age,
                index: result.index,
                dollar_value: result.dollar_value,
                breakdown: result.breakdown,
            }
        })
        .collect();

    rank_entries(&mut entries);
    info!("valued {} players", entries.len());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str, age: u32, position: &str) -> StoredPlayer {
        StoredPlayer {
            id: id.to_string(),
            name: format!("Player {id}"),
            team: "NYY".to_string(),
            age: Some(age),
            position: position.to_string(),
            games_played: Some(150),
        }
    }

    fn entry(id: &str, dollars: f64, index: f64) -> RankedEntry {
        RankedEntry {
            rank: 0,
            player_id: id.to_string(),
            name: id.to_string(),
            team: String::new(),
            position: String::new(),
            age: None,
            seasons: 0,
            index,
            dollar_value: dollars,
            breakdown: valuate_with(
                &warbook_valuation::PlayerRecord::new(None, "", None),
                &[],
                &ValuationParams::default(),
            )
            .breakdown,
        }
    }

    #[test]
    fn rank_orders_by_dollars_then_index_then_id() {
        let mut entries = vec![
            entry("c", 10.0, 5.0),
            entry("a", 30.0, 9.0),
            entry("d", 10.0, 5.0),
            entry("b", 10.0, 6.0),
        ];
        rank_entries(&mut entries);
        let order: Vec<&str> = entries.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn valuate_all_ranks_stored_players() {
        let db = Database::open(":memory:").unwrap();
        db.upsert_player(&stored("star", 27, "SS")).unwrap();
        db.upsert_player(&stored("bench", 36, "DH")).unwrap();
        db.upsert_player(&stored("rookie", 22, "2B")).unwrap();
        db.upsert_season("star", &SeasonRecord::new(2023, 6.5, Some(155)))
            .unwrap();
        db.upsert_season("star", &SeasonRecord::new(2024, 7.0, Some(150)))
            .unwrap();
        db.upsert_season("bench", &SeasonRecord::new(2024, 0.8, Some(60)))
            .unwrap();

        let entries =
            valuate_all(&db, &PlayerFilter::default(), &ValuationParams::default()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].player_id, "star");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].seasons, 2);
        // No seasons: valued at zero, still listed.
        let rookie = entries.iter().find(|e| e.player_id == "rookie").unwrap();
        assert_eq!(rookie.seasons, 0);
        assert_eq!(rookie.dollar_value, 0.0);
        assert!(entries
            .windows(2)
            .all(|w| w[0].dollar_value >= w[1].dollar_value));
    }

    #[test]
    fn valuate_all_respects_filter() {
        let db = Database::open(":memory:").unwrap();
        db.upsert_player(&stored("a", 27, "SS")).unwrap();
        db.upsert_player(&stored("b", 29, "C")).unwrap();

        let filter = PlayerFilter {
            position: Some("C".into()),
            team: None,
        };
        let entries = valuate_all(&db, &filter, &ValuationParams::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_id, "b");
    }

    #[test]
    fn position_filter_finds_shortstops_however_spelled() {
        let db = Database::open(":memory:").unwrap();
        db.upsert_player(&stored("a", 27, "SS")).unwrap();
        db.upsert_player(&stored("b", 28, "shortstop")).unwrap();
        db.upsert_player(&stored("c", 29, "Short Stop")).unwrap();
        db.upsert_player(&stored("d", 30, "C")).unwrap();

        let filter = PlayerFilter {
            position: Some("SS".into()),
            team: None,
        };
        let entries = valuate_all(&db, &filter, &ValuationParams::default()).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.player_id != "d"));
    }

    #[test]
    fn pipeline_matches_direct_valuation() {
        let db = Database::open(":memory:").unwrap();
        let player = stored("p", 29, "CF");
        db.upsert_player(&player).unwrap();
        let seasons = vec![
            SeasonRecord::new(2022, 4.2, Some(155)).with_secondary(81.0),
            SeasonRecord::new(2023, 5.1, Some(149)),
            SeasonRecord::new(2024, 3.7, Some(120)).with_secondary(74.0),
        ];
        for s in &seasons {
            db.upsert_season("p", s).unwrap();
        }

        let params = ValuationParams::default();
        let entries = valuate_all(&db, &PlayerFilter::default(), &params).unwrap();
        let direct = valuate_player(&player, &seasons, &params);
        assert_eq!(entries[0].dollar_value, direct.dollar_value);
        assert_eq!(entries[0].index, direct.index);
        assert_eq!(entries[0].breakdown, direct.breakdown);
    }
}
