// Factor library: independent multiplicative adjustments centered at 1.0.
//
// Each function maps one input dimension to a factor. Every result passes
// through `clamp_factor`: results stay finite and strictly positive.

use crate::aggregate::HistoricalAggregate;
use crate::params::{
    AgeParams, ConsistencyParams, PlayingTimeParams, PositionParams, PremiumParams,
    TrackRecordParams,
};
use crate::records::{finite_or_zero, Role};

/// Smallest factor any function will return.
pub const FACTOR_FLOOR: f64 = 0.05;
/// Largest factor any function will return.
pub const FACTOR_CEILING: f64 = 3.0;

/// Force a factor into `[FACTOR_FLOOR, FACTOR_CEILING]`; non-finite becomes 1.0.
pub fn clamp_factor(value: f64) -> f64 {
    if !value.is_finite() {
        return 1.0;
    }
    value.clamp(FACTOR_FLOOR, FACTOR_CEILING)
}

// ---------------------------------------------------------------------------
// Age
// ---------------------------------------------------------------------------

/// Step function over age bands. Unknown age is neutral.
///
/// With the elite override enabled, a player whose current metric reaches
/// `elite_override_metric` keeps only `elite_decline_share` of a declining
/// band's discount.
pub fn age_factor(age: Option<u32>, current_metric: f64, params: &AgeParams) -> f64 {
    let Some(age) = age else {
        return 1.0;
    };

    let band = params
        .bands
        .iter()
        .find(|b| age <= b.max_age)
        .map(|b| b.factor)
        .unwrap_or(params.late_career);

    let elite_now = params.elite_override
        && finite_or_zero(current_metric) >= params.elite_override_metric;

    let factor = if elite_now && band < 1.0 {
        1.0 - (1.0 - band) * params.elite_decline_share.clamp(0.0, 1.0)
    } else {
        band
    };

    clamp_factor(factor)
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Scarcity adjustment for the player's role. Unknown role is neutral.
pub fn position_factor(role: Option<Role>, params: &PositionParams) -> f64 {
    match role {
        Some(role) => clamp_factor(params.factor_for(role)),
        None => 1.0,
    }
}

// ---------------------------------------------------------------------------
// Playing time
// ---------------------------------------------------------------------------

/// Share of a full season played, mapped linearly onto `[unknown_factor, 1.0]`.
///
/// Unknown games played sits at the floor, so reporting any games never
/// values a player below leaving them out. The share is clamped to
/// `[min_share, 1.0]` before mapping.
pub fn playing_time_factor(games_played: Option<u32>, params: &PlayingTimeParams) -> f64 {
    let floor = params.unknown_factor.min(1.0);
    let Some(games) = games_played else {
        return clamp_factor(floor);
    };
    if params.full_season_games == 0 {
        return 1.0;
    }
    let share = games as f64 / params.full_season_games as f64;
    let share = share.clamp(params.min_share.clamp(0.0, 1.0), 1.0);
    clamp_factor(floor + (1.0 - floor) * share)
}

// ---------------------------------------------------------------------------
// Elite-skill premium
// ---------------------------------------------------------------------------

/// Compounded bonus for rare profiles.
///
/// Sub-bonuses multiply independently: the two-way role, the best power
/// tier reached by the latest power score, and the best elite-season tier
/// reached. A missing power score skips that sub-bonus.
pub fn elite_premium(
    role: Option<Role>,
    power_score: Option<f64>,
    elite_seasons: usize,
    params: &PremiumParams,
) -> f64 {
    let mut premium = 1.0;

    if role == Some(Role::TwoWay) {
        premium *= params.two_way_bonus;
    }

    if let Some(score) = power_score.filter(|s| s.is_finite()) {
        premium *= params
            .power_tiers
            .iter()
            .filter(|t| score >= t.threshold)
            .map(|t| t.multiplier)
            .fold(1.0, f64::max);
    }

    premium *= params
        .elite_season_tiers
        .iter()
        .filter(|t| elite_seasons >= t.min_seasons)
        .map(|t| t.multiplier)
        .fold(1.0, f64::max);

    clamp_factor(premium)
}

// ---------------------------------------------------------------------------
// Track record
// ---------------------------------------------------------------------------

/// Sample-size adjustment.
///
/// - no seasons: `no_history`
/// - one season: `single_season`, or `single_elite_season` if it was elite
/// - two seasons: `two_seasons`
/// - three or more: a spike discount times a legacy bonus (see below)
///
/// The spike discount kicks in once the current value exceeds the trailing
/// average by more than `spike_tolerance` (relative to `max(trailing, 1.0)`)
/// and falls linearly at `spike_slope` to `spike_floor`. The legacy bonus
/// requires `legacy_min_elite_seasons` and grows with consistency above
/// `legacy_consistency_start`, up to `legacy_max_bonus`. Both pieces are
/// continuous in the current value.
pub fn track_record_multiplier(
    history: &HistoricalAggregate,
    elite_threshold: f64,
    params: &TrackRecordParams,
) -> f64 {
    let factor = match history.seasons_played {
        0 => params.no_history,
        1 if history.current >= elite_threshold => params.single_elite_season,
        1 => params.single_season,
        2 => params.two_seasons,
        _ => spike_discount(history, params) * legacy_bonus(history, params),
    };
    clamp_factor(factor)
}

fn spike_discount(history: &HistoricalAggregate, params: &TrackRecordParams) -> f64 {
    let scale = history.trailing_average.max(1.0);
    let excess = (history.current - history.trailing_average) / scale - params.spike_tolerance;
    if excess <= 0.0 {
        return 1.0;
    }
    (1.0 - params.spike_slope * excess).max(params.spike_floor)
}

fn legacy_bonus(history: &HistoricalAggregate, params: &TrackRecordParams) -> f64 {
    if history.elite_seasons < params.legacy_min_elite_seasons {
        return 1.0;
    }
    let Some(score) = history.consistency else {
        return 1.0;
    };
    let span = (100.0 - params.legacy_consistency_start).max(f64::EPSILON);
    let progress = ((score - params.legacy_consistency_start) / span).clamp(0.0, 1.0);
    1.0 + params.legacy_max_bonus * progress
}

// ---------------------------------------------------------------------------
// Consistency
// ---------------------------------------------------------------------------

/// Linear bonus from 1.0 at score 0 to `1.0 + max_bonus` at score 100.
/// Absent score is neutral.
pub fn consistency_bonus(score: Option<f64>, params: &ConsistencyParams) -> f64 {
    match score.filter(|s| s.is_finite()) {
        Some(s) => clamp_factor(1.0 + params.max_bonus * s.clamp(0.0, 100.0) / 100.0),
        None => 1.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
