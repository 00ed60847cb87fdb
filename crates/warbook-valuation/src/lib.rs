// Player valuation engine.
//
// Pure, synchronous transformation from a player's attributes and season
// history to a dollar estimate and a 0-100 index:
//
//   seasons -> aggregate -> { blend, factors } -> compositor -> ValuationResult

pub mod aggregate;
pub mod blend;
pub mod compositor;
pub mod factors;
pub mod params;
pub mod records;

pub use aggregate::{aggregate, HistoricalAggregate};
pub use compositor::{valuate, valuate_with, Breakdown, ValuationResult};
pub use params::ValuationParams;
pub use records::{PlayerRecord, Role, SeasonRecord};
