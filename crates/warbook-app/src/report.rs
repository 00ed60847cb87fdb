// Paginated JSON report of ranked valuations.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::RankedEntry;

/// One page of the ranked valuation table, as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationReport {
    pub generated_at: DateTime<Utc>,
    /// Players valued in this run, across all pages.
    pub total_players: usize,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub entries: Vec<RankedEntry>,
}

/// Number of pages needed for `total` entries. Always at least 1.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Slice one page out of already-ranked entries. Page numbers start at 1;
/// page 0 is treated as page 1 and pages past the end are empty.
pub fn build_report(
    ranked: &[RankedEntry],
    page: usize,
    page_size: usize,
    generated_at: DateTime<Utc>,
) -> ValuationReport {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1).saturating_mul(page_size).min(ranked.len());
    let end = start.saturating_add(page_size).min(ranked.len());

    ValuationReport {
        generated_at,
        total_players: ranked.len(),
        page,
        page_size,
        total_pages: page_count(ranked.len(), page_size),
        entries: ranked[start..end].to_vec(),
    }
}

/// Serialize the report as pretty JSON, creating parent directories.
pub fn write_report(report: &ValuationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
