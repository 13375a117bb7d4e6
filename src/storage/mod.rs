//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Walk checkpoints per category
//! - The pending and quarantined detail-link queues
//! - Write-once app records with their sub-records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{LinkStore, ProgressStore, RecordStore, StorageError, StorageResult};

/// What happened to a link after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still pending; will be retried by the next pipeline run
    Retained { attempts: u32 },
    /// Moved out of the pending queue
    Quarantined { attempts: u32 },
}

/// A link that is no longer retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedLink {
    pub url: String,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub quarantined_at: String,
}

/// Search hit in the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSummary {
    pub app_id: String,
    pub app_name: String,
    pub category: String,
    pub price: String,
}

/// Row counts across all tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageCounts {
    pub apps: u64,
    pub languages: u64,
    pub purchases: u64,
    pub reviews: u64,
    pub pending_links: u64,
    pub quarantined_links: u64,
}

