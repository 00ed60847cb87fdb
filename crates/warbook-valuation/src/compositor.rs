// Valuation compositor: runs the aggregator, blending policy and factor
// library, projects a discounted multi-year dollar value, and maps it onto a
// bounded 0-100 index.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{aggregate, HistoricalAggregate};
use crate::blend::blend;
use crate::factors::{
    age_factor, consistency_bonus, elite_premium, playing_time_factor, position_factor,
    track_record_multiplier,
};
use crate::params::{HorizonParams, ValuationParams};
use crate::records::{finite_or_zero, PlayerRecord, Role, SeasonRecord};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Named intermediates behind a valuation. Factors are reported as rounded
/// percentages (1.06 -> 106).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub blended_metric: f64,
    pub age_factor_pct: f64,
    pub position_factor_pct: f64,
    pub playing_time_factor_pct: f64,
    pub elite_premium_pct: f64,
    pub track_record_pct: f64,
    pub consistency_bonus_pct: f64,
    pub horizon_years: u32,
    pub base_value_per_year: f64,
    pub present_value_sum: f64,
}

impl Breakdown {
    /// The breakdown as a name -> value map, for display layers that render
    /// intermediates generically.
    pub fn entries(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("blended_metric", self.blended_metric),
            ("age_factor", self.age_factor_pct),
            ("position_factor", self.position_factor_pct),
            ("playing_time_factor", self.playing_time_factor_pct),
            ("elite_premium", self.elite_premium_pct),
            ("track_record", self.track_record_pct),
            ("consistency_bonus", self.consistency_bonus_pct),
            ("horizon_years", self.horizon_years as f64),
            ("base_value_per_year", self.base_value_per_year),
            ("present_value_sum", self.present_value_sum),
        ])
    }
}

/// The engine's output for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    /// 0-100, rounded to one decimal place.
    pub index: f64,
    /// Whole dollars, never negative.
    pub dollar_value: f64,
    pub breakdown: Breakdown,
}

/// The multiplicative factors applied to the present value, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedFactors {
    pub age: f64,
    pub position: f64,
    pub playing_time: f64,
    pub elite_premium: f64,
    pub track_record: f64,
    pub consistency: f64,
}

impl AppliedFactors {
    /// Compute every factor for a player once.
    pub fn compute(
        player: &PlayerRecord,
        history: &HistoricalAggregate,
        params: &ValuationParams,
    ) -> Self {
        let role = player.role();
        AppliedFactors {
            age: age_factor(player.age, history.current, &params.age),
            position: position_factor(role, &params.position),
            playing_time: playing_time_factor(
                history.current_games.or(player.games_played),
                &params.playing_time,
            ),
            elite_premium: elite_premium(
                role,
                history.current_secondary,
                history.elite_seasons,
                &params.premium,
            ),
            track_record: track_record_multiplier(
                history,
                params.elite_season_threshold,
                &params.track_record,
            ),
            consistency: consistency_bonus(history.consistency, &params.consistency),
        }
    }

    pub fn product(&self) -> f64 {
        self.age
            * self.position
            * self.playing_time
            * self.elite_premium
            * self.track_record
            * self.consistency
    }
}

// ---------------------------------------------------------------------------
// Horizon and discounting
// ---------------------------------------------------------------------------

/// Number of future years a player's value is projected over.
///
/// Pitchers run to `pitcher_end_age`, everyone else (two-way players
/// included) to `position_player_end_age`. The result is clamped to
/// `[min_years, max_years]`; unknown age uses `unknown_age_years`.
pub fn horizon_years(age: Option<u32>, role: Option<Role>, params: &HorizonParams) -> u32 {
    let min = params.min_years.max(1);
    let max = params.max_years.max(min);

    let Some(age) = age else {
        return params.unknown_age_years.max(min).min(max);
    };

    let end_age = if role.is_some_and(|r| r.is_pitcher()) {
        params.pitcher_end_age
    } else {
        params.position_player_end_age
    };

    let remaining = i64::from(end_age) - i64::from(age);
    remaining.clamp(i64::from(min), i64::from(max)) as u32
}

/// Sum of `per_year / (1 + rate)^year` for years `1..=years`.
pub fn present_value(per_year: f64, years: u32, rate: f64) -> f64 {
    let rate = finite_or_zero(rate).max(0.0);
    (1..=years)
        .map(|year| per_year / (1.0 + rate).powi(year as i32))
        .sum()
}

/// Map a dollar estimate onto 0-100 with a saturating exponential:
/// `100 * (1 - exp(-dollars / scale))`, rounded to one decimal place.
///
/// Monotonic and bounded; half the index is reached at `scale * ln 2`.
pub fn index_from_dollars(dollars: f64, scale: f64) -> f64 {
    if !scale.is_finite() || scale <= 0.0 {
        return 0.0;
    }
    let dollars = finite_or_zero(dollars).max(0.0);
    let raw = 100.0 * (1.0 - (-dollars / scale).exp());
    round_to(raw.clamp(0.0, 100.0), 1)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn as_pct(factor: f64) -> f64 {
    (factor * 100.0).round()
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Value a player with the default parameters.
pub fn valuate(player: &PlayerRecord, seasons: &[SeasonRecord]) -> ValuationResult {
    valuate_with(player, seasons, &ValuationParams::default())
}

/// Value a player from their season history.
///
/// Steps:
/// 1. Aggregate the seasons (sorted internally, caller order ignored).
/// 2. Blend current and historical performance into the working metric.
/// 3. Compute every factor once.
/// 4. Per-year base = working metric x `dollars_per_unit`, floored at 0.
/// 5. Discount the base over the horizon and sum.
/// 6. Multiply the present value by the product of the factors.
/// 7. Round to whole dollars and derive the index.
///
/// Never fails: sparse or malformed input degrades to neutral factors and,
/// at worst, a zero valuation.
pub fn valuate_with(
    player: &PlayerRecord,
    seasons: &[SeasonRecord],
    params: &ValuationParams,
) -> ValuationResult {
    let history = aggregate(seasons, params.elite_season_threshold);
    let blended = finite_or_zero(blend(&history, &params.blend));
    let factors = AppliedFactors::compute(player, &history, params);

    let base_value_per_year = (blended * finite_or_zero(params.dollars_per_unit)).max(0.0);
    let horizon = horizon_years(player.age, player.role(), &params.horizon);
    let present_value_sum = present_value(base_value_per_year, horizon, params.discount_rate);

    let dollars = finite_or_zero(present_value_sum * factors.product()).max(0.0);
    let dollar_value = dollars.round();
    let index = index_from_dollars(dollar_value, params.index_scale);

    debug!(
        "valuated: seasons={} blended={:.3} factors={:.4} horizon={} value=${} index={}",
        history.seasons_played,
        blended,
        factors.product(),
        horizon,
        dollar_value,
        index
    );

    ValuationResult {
        index,
        dollar_value,
        breakdown: Breakdown {
            blended_metric: round_to(blended, 3),
            age_factor_pct: as_pct(factors.age),
            position_factor_pct: as_pct(factors.position),
            playing_time_factor_pct: as_pct(factors.playing_time),
            elite_premium_pct: as_pct(factors.elite_premium),
            track_record_pct: as_pct(factors.track_record),
            consistency_bonus_pct: as_pct(factors.consistency),
            horizon_years: horizon,
            base_value_per_year: base_value_per_year.round(),
            present_value_sum: present_value_sum.round(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
