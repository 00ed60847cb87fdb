// Batch valuation over the stored player table and the ranked JSON report.

pub mod pipeline;
pub mod report;

pub use pipeline::{rank_entries, valuate_all, valuate_player, RankedEntry};
pub use report::{build_report, page_count, write_report, ValuationReport};
