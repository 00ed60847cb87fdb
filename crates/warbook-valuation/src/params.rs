// Tunable valuation constants.
//
// Every number the engine uses is a field here. All structs deserialize with
// `#[serde(default)]`, so a config file only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::records::Role;

// ---------------------------------------------------------------------------
// Top-level parameter set
// ---------------------------------------------------------------------------

/// The complete set of constants used by `valuate_with`.
///
/// Metric scale: win contribution in wins (replacement ~2, elite ~8). The
/// elite threshold and every tier below assume that scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationParams {
    /// Dollars paid per unit of blended metric per future year.
    pub dollars_per_unit: f64,
    /// Annual discount rate applied to future years.
    pub discount_rate: f64,
    /// A season at or above this metric counts as elite.
    pub elite_season_threshold: f64,
    /// Dollar scale of the saturating 0-100 index curve.
    pub index_scale: f64,
    pub blend: BlendParams,
    pub age: AgeParams,
    pub position: PositionParams,
    pub playing_time: PlayingTimeParams,
    pub premium: PremiumParams,
    pub track_record: TrackRecordParams,
    pub consistency: ConsistencyParams,
    pub horizon: HorizonParams,
}

impl Default for ValuationParams {
    fn default() -> Self {
        ValuationParams {
            dollars_per_unit: 8_000_000.0,
            discount_rate: 0.05,
            elite_season_threshold: 4.0,
            index_scale: 150_000_000.0,
            blend: BlendParams::default(),
            age: AgeParams::default(),
            position: PositionParams::default(),
            playing_time: PlayingTimeParams::default(),
            premium: PremiumParams::default(),
            track_record: TrackRecordParams::default(),
            consistency: ConsistencyParams::default(),
            horizon: HorizonParams::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Blending policy
// ---------------------------------------------------------------------------

/// Weights for combining the current season with history.
///
/// For three or more seasons the deviation from the trailing average is
/// credited in bands: the first `spike_threshold` (or `decline_threshold`)
/// fraction at `stable_weight`, anything beyond at `spike_weight` (or
/// `decline_weight`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendParams {
    /// Current-season weight when exactly two seasons exist.
    pub two_season_current_weight: f64,
    pub stable_weight: f64,
    pub spike_threshold: f64,
    pub spike_weight: f64,
    pub decline_threshold: f64,
    pub decline_weight: f64,
    /// Smallest trailing average used as the denominator for percentage bands.
    pub min_scale: f64,
}

impl Default for BlendParams {
    fn default() -> Self {
        BlendParams {
            two_season_current_weight: 0.6,
            stable_weight: 0.5,
            spike_threshold: 0.20,
            spike_weight: 0.3,
            decline_threshold: 0.20,
            decline_weight: 0.7,
            min_scale: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Age curve
// ---------------------------------------------------------------------------

/// One step of the age curve: applies to every age up to and including `max_age`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub max_age: u32,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeParams {
    /// Bands in ascending `max_age` order.
    pub bands: Vec<AgeBand>,
    /// Factor for ages past the last band.
    pub late_career: f64,
    /// Flatten the decline for players currently producing at an elite level.
    pub elite_override: bool,
    pub elite_override_metric: f64,
    /// Share of the decline discount kept when the override applies.
    pub elite_decline_share: f64,
}

impl Default for AgeParams {
    fn default() -> Self {
        AgeParams {
            bands: vec![
                AgeBand { max_age: 23, factor: 1.04 },
                AgeBand { max_age: 26, factor: 1.10 },
                AgeBand { max_age: 29, factor: 1.14 },
                AgeBand { max_age: 30, factor: 1.10 },
                AgeBand { max_age: 32, factor: 0.95 },
                AgeBand { max_age: 34, factor: 0.82 },
                AgeBand { max_age: 36, factor: 0.65 },
            ],
            late_career: 0.45,
            elite_override: true,
            elite_override_metric: 6.0,
            elite_decline_share: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Position table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionParams {
    pub catcher: f64,
    pub first_base: f64,
    pub second_base: f64,
    pub third_base: f64,
    pub shortstop: f64,
    pub left_field: f64,
    pub center_field: f64,
    pub right_field: f64,
    pub outfield: f64,
    pub designated_hitter: f64,
    pub starting_pitcher: f64,
    pub relief_pitcher: f64,
    pub two_way: f64,
}

impl PositionParams {
    /// Table lookup for a parsed role.
    pub fn factor_for(&self, role: Role) -> f64 {
        match role {
            Role::Catcher => self.catcher,
            Role::FirstBase => self.first_base,
            Role::SecondBase => self.second_base,
            Role::ThirdBase => self.third_base,
            Role::ShortStop => self.shortstop,
            Role::LeftField => self.left_field,
            Role::CenterField => self.center_field,
            Role::RightField => self.right_field,
            Role::Outfield => self.outfield,
            Role::DesignatedHitter => self.designated_hitter,
            Role::StartingPitcher => self.starting_pitcher,
            Role::ReliefPitcher => self.relief_pitcher,
            Role::TwoWay => self.two_way,
        }
    }
}

impl Default for PositionParams {
    fn default() -> Self {
        PositionParams {
            catcher: 1.05,
            first_base: 0.97,
            second_base: 1.02,
            third_base: 1.01,
            shortstop: 1.06,
            left_field: 0.98,
            center_field: 1.04,
            right_field: 0.99,
            outfield: 0.99,
            designated_hitter: 0.88,
            starting_pitcher: 1.00,
            relief_pitcher: 0.85,
            two_way: 1.00,
        }
    }
}

// ---------------------------------------------------------------------------
// Playing time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayingTimeParams {
    pub full_season_games: u32,
    /// Shares below this are treated as this share.
    pub min_share: f64,
    /// Factor for unknown games played; also the floor of the known-games range.
    pub unknown_factor: f64,
}

impl Default for PlayingTimeParams {
    fn default() -> Self {
        PlayingTimeParams {
            full_season_games: 162,
            min_share: 0.0,
            unknown_factor: 0.85,
        }
    }
}

// ---------------------------------------------------------------------------
// Elite-skill premium
// ---------------------------------------------------------------------------

/// A bonus that applies once a score reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub threshold: f64,
    pub multiplier: f64,
}

/// A bonus that applies once a player has `min_seasons` elite seasons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountTier {
    pub min_seasons: usize,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumParams {
    pub two_way_bonus: f64,
    pub power_tiers: Vec<ScoreTier>,
    pub elite_season_tiers: Vec<CountTier>,
}

impl Default for PremiumParams {
    fn default() -> Self {
        PremiumParams {
            two_way_bonus: 1.20,
            power_tiers: vec![
                ScoreTier { threshold: 90.0, multiplier: 1.08 },
                ScoreTier { threshold: 80.0, multiplier: 1.05 },
                ScoreTier { threshold: 70.0, multiplier: 1.02 },
            ],
            elite_season_tiers: vec![
                CountTier { min_seasons: 7, multiplier: 1.10 },
                CountTier { min_seasons: 5, multiplier: 1.06 },
                CountTier { min_seasons: 3, multiplier: 1.03 },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Track record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackRecordParams {
    pub no_history: f64,
    pub single_season: f64,
    pub single_elite_season: f64,
    pub two_seasons: f64,
    /// Relative excess over the trailing average tolerated before discounting.
    pub spike_tolerance: f64,
    /// Discount per unit of relative excess beyond the tolerance.
    pub spike_slope: f64,
    pub spike_floor: f64,
    pub legacy_min_elite_seasons: usize,
    /// Consistency score where the legacy bonus starts to build.
    pub legacy_consistency_start: f64,
    pub legacy_max_bonus: f64,
}

impl Default for TrackRecordParams {
    fn default() -> Self {
        TrackRecordParams {
            no_history: 0.75,
            single_season: 0.80,
            single_elite_season: 0.92,
            two_seasons: 0.92,
            spike_tolerance: 0.5,
            spike_slope: 0.25,
            spike_floor: 0.85,
            legacy_min_elite_seasons: 5,
            legacy_consistency_start: 60.0,
            legacy_max_bonus: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// Consistency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyParams {
    /// Bonus at a perfect consistency score of 100.
    pub max_bonus: f64,
}

impl Default for ConsistencyParams {
    fn default() -> Self {
        ConsistencyParams { max_bonus: 0.05 }
    }
}

// ---------------------------------------------------------------------------
// Horizon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonParams {
    pub position_player_end_age: u32,
    pub pitcher_end_age: u32,
    pub min_years: u32,
    pub max_years: u32,
    pub unknown_age_years: u32,
}

impl Default for HorizonParams {
    fn default() -> Self {
        HorizonParams {
            position_player_end_age: 36,
            pitcher_end_age: 34,
            min_years: 1,
            max_years: 8,
            unknown_age_years: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
