// Season aggregation: reduces a player's season lines into the recency and
// career figures the blending policy and factor library consume.

use serde::Serialize;

use crate::records::{finite_or_zero, SeasonRecord};

/// Number of seasons in the trailing average.
pub const TRAILING_SEASONS: usize = 3;

// ---------------------------------------------------------------------------
// Spread statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation of a player's season metrics.
#[derive(Debug, Clone, Copy)]
pub struct SpreadStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Compute mean and population standard deviation for a slice of values.
///
/// Returns zeros for an empty slice. The N denominator is used because the
/// seasons are the player's full record rather than a sample of it.
pub fn spread_stats(values: &[f64]) -> SpreadStats {
    if values.is_empty() {
        return SpreadStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    SpreadStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Consistency score: `clamp(100 - CV%, 0, 100)`.
///
/// `None` with fewer than two values or a non-positive mean, where the
/// coefficient of variation is meaningless.
pub fn consistency_score(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let stats = spread_stats(values);
    if stats.mean <= 0.0 {
        return None;
    }
    let cv_pct = stats.stdev / stats.mean * 100.0;
    Some((100.0 - cv_pct).clamp(0.0, 100.0))
}

// ---------------------------------------------------------------------------
// Historical aggregate
// ---------------------------------------------------------------------------

/// Career and recency figures derived from a player's seasons.
///
/// Rebuilt on every valuation; it has no identity beyond the seasons it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalAggregate {
    pub seasons_played: usize,
    /// Year of the most recent season present (the dataset may lag).
    pub current_season: Option<i32>,
    pub current: f64,
    /// Metric of the second most recent season.
    pub previous: Option<f64>,
    /// Mean over the most recent `min(3, N)` seasons.
    pub trailing_average: f64,
    pub peak: f64,
    pub elite_seasons: usize,
    pub consistency: Option<f64>,
    /// Power score of the most recent season, if reported.
    pub current_secondary: Option<f64>,
    /// Games played in the most recent season, if reported.
    pub current_games: Option<u32>,
}

impl HistoricalAggregate {
    /// The aggregate of a player with no recorded seasons.
    pub fn empty() -> Self {
        HistoricalAggregate {
            seasons_played: 0,
            current_season: None,
            current: 0.0,
            previous: None,
            trailing_average: 0.0,
            peak: 0.0,
            elite_seasons: 0,
            consistency: None,
            current_secondary: None,
            current_games: None,
        }
    }

    /// `false` when the player has no seasons at all.
    pub fn has_history(&self) -> bool {
        self.seasons_played > 0
    }
}

/// Return the seasons ordered most recent first, without touching the input.
///
/// Ties on season year (which callers should not send) are broken by metric
/// so the result never depends on input order.
pub fn by_recency(seasons: &[SeasonRecord]) -> Vec<&SeasonRecord> {
    let mut ordered: Vec<&SeasonRecord> = seasons.iter().collect();
    ordered.sort_by(|a, b| {
        b.season
            .cmp(&a.season)
            .then_with(|| finite_or_zero(b.metric).total_cmp(&finite_or_zero(a.metric)))
    });
    ordered
}

/// Build the historical aggregate for one player's seasons.
///
/// Non-finite metrics count as 0.0. A season is elite when its metric is at
/// least `elite_threshold`.
pub fn aggregate(seasons: &[SeasonRecord], elite_threshold: f64) -> HistoricalAggregate {
    if seasons.is_empty() {
        return HistoricalAggregate::empty();
    }

    let ordered = by_recency(seasons);
    let metrics: Vec<f64> = ordered.iter().map(|s| finite_or_zero(s.metric)).collect();

    let trailing = &metrics[..metrics.len().min(TRAILING_SEASONS)];
    let trailing_average = trailing.iter().sum::<f64>() / trailing.len() as f64;

    let peak = metrics.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let elite_seasons = metrics.iter().filter(|&&m| m >= elite_threshold).count();

    let latest = ordered[0];

    HistoricalAggregate {
        seasons_played: metrics.len(),
        current_season: Some(latest.season),
        current: metrics[0],
        previous: metrics.get(1).copied(),
        trailing_average,
        peak,
        elite_seasons,
        consistency: consistency_score(&metrics),
        current_secondary: latest.secondary_metric.filter(|v| v.is_finite()),
        current_games: latest.games_played,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
