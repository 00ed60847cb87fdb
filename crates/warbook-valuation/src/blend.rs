// Blending policy: collapses the current season and the player's history
// into the single metric the compositor values.

use crate::aggregate::HistoricalAggregate;
use crate::params::BlendParams;

/// Produce the working metric for a player.
///
/// - zero or one season: the raw current value (the track-record factor
///   carries the small-sample penalty)
/// - two seasons: `two_season_current_weight` on the current value, the rest
///   on the previous one
/// - three or more: the trailing average plus a credited share of the
///   current season's deviation from it, see [`credited_deviation`]
pub fn blend(history: &HistoricalAggregate, params: &BlendParams) -> f64 {
    match history.seasons_played {
        0 | 1 => history.current,
        2 => {
            let previous = history.previous.unwrap_or(history.current);
            let w = params.two_season_current_weight.clamp(0.0, 1.0);
            w * history.current + (1.0 - w) * previous
        }
        _ => {
            let deviation = history.current - history.trailing_average;
            let scale = history.trailing_average.max(params.min_scale);
            history.trailing_average + credited_deviation(deviation, scale, params)
        }
    }
}

/// How much of the deviation from the trailing average to keep.
///
/// The deviation is credited in bands sized relative to `scale`. Inside the
/// threshold it is weighted at `stable_weight`. Past `spike_threshold` a rise
/// is weighted at `spike_weight`, treating the excess as partly noise; past
/// `decline_threshold` a drop is weighted at `decline_weight`, treating it as
/// real. Bands are marginal, so the result never jumps as a threshold is
/// crossed and keeps rising with the current value.
pub fn credited_deviation(deviation: f64, scale: f64, params: &BlendParams) -> f64 {
    let stable = params.stable_weight.clamp(0.0, 1.0);
    if deviation >= 0.0 {
        let band = params.spike_threshold.max(0.0) * scale;
        let spike = params.spike_weight.clamp(0.0, 1.0);
        stable * deviation.min(band) + spike * (deviation - band).max(0.0)
    } else {
        let drop = -deviation;
        let band = params.decline_threshold.max(0.0) * scale;
        let decline = params.decline_weight.clamp(0.0, 1.0);
        -(stable * drop.min(band) + decline * (drop - band).max(0.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
