//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::state::CrawlCursor;
use crate::storage::{ProgressStore, RecordStore, StorageCounts};
use crate::HarvestError;
use std::fmt::Write;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Row counts of every table
    pub counts: StorageCounts,

    /// Walk position of every category seen so far
    pub cursors: Vec<CrawlCursor>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics<S>(storage: &S) -> Result<HarvestStatistics, HarvestError>
where
    S: ProgressStore + RecordStore,
{
    Ok(HarvestStatistics {
        counts: storage.counts()?,
        cursors: storage.list_cursors()?,
    })
}

/// Renders statistics as the text printed by `--stats`
pub fn format_statistics(stats: &HarvestStatistics) -> String {
    let counts = &stats.counts;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Harvest Statistics ===\n");

    let _ = writeln!(out, "Records:");
    let _ = writeln!(out, "  Apps: {}", counts.apps);
    let _ = writeln!(out, "  Languages: {}", counts.languages);
    let _ = writeln!(out, "  In-app purchases: {}", counts.purchases);
    let _ = writeln!(out, "  Reviews: {}", counts.reviews);
    let _ = writeln!(out);

    let _ = writeln!(out, "Link queue:");
    let _ = writeln!(out, "  Pending: {}", counts.pending_links);
    let _ = writeln!(out, "  Quarantined: {}", counts.quarantined_links);
    let _ = writeln!(out);

    if stats.cursors.is_empty() {
        let _ = writeln!(out, "No categories walked yet");
    } else {
        let _ = writeln!(out, "Category cursors ({}):", stats.cursors.len());
        for cursor in &stats.cursors {
            let _ = writeln!(
                out,
                "  {} -> letter {}, page {}",
                cursor.category_url,
                cursor.letter(),
                cursor.page()
            );
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    print!("{}", format_statistics(stats));
}
