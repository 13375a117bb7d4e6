//! Output module: the read-only reporting layer
//!
//! This module handles:
//! - Harvest statistics for `--stats`
//! - Keyword search results for `--search`
//! - The single-app detail view for `--show`

mod report;
pub mod stats;

pub use report::{format_app_detail, format_quarantined, format_search_results};
pub use stats::{format_statistics, load_statistics, print_statistics, HarvestStatistics};
