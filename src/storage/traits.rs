//! Storage traits and error types
//!
//! The crawl is written against three narrow store interfaces. All methods
//! take `&self`: an implementation owns its own synchronization so a single
//! instance can be shared between the walker and every pipeline worker.

use crate::extract::ParsedApp;
use crate::state::CrawlCursor;
use crate::storage::{AppSummary, FailureOutcome, QuarantinedLink, StorageCounts};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Link is not queued: {0}")]
    UnknownLink(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Resume cursors of category walks
pub trait ProgressStore {
    /// Loads the cursor of a category, defaulting to the first page of `A`
    fn load_cursor(&self, category_url: &str) -> StorageResult<CrawlCursor>;

    /// Upserts a cursor; the last write wins
    fn save_cursor(&self, cursor: &CrawlCursor) -> StorageResult<()>;

    /// Every stored cursor, ordered by category URL
    fn list_cursors(&self) -> StorageResult<Vec<CrawlCursor>>;
}

/// Durable queue of detail-page URLs
pub trait LinkStore {
    /// Adds URLs to the queue, returning how many were not already pending
    ///
    /// Quarantined URLs are not re-queued.
    fn enqueue_links(&self, urls: &BTreeSet<String>) -> StorageResult<usize>;

    /// Snapshot of every pending URL
    fn list_links(&self) -> StorageResult<Vec<String>>;

    /// Removes a URL, returning false if it was not pending
    fn remove_link(&self, url: &str) -> StorageResult<bool>;

    /// Records a failed attempt
    ///
    /// When `max_attempts` is non-zero and the attempt count reaches it, the
    /// link moves to quarantine and is no longer listed.
    fn record_failure(&self, url: &str, error: &str, max_attempts: u32) -> StorageResult<FailureOutcome>;

    /// Links that were given up on
    fn list_quarantined(&self) -> StorageResult<Vec<QuarantinedLink>>;
}

/// Write-once sink and read side for app records
pub trait RecordStore {
    /// Stores an app with its languages, purchases and reviews in one
    /// transaction
    ///
    /// Returns false, leaving the stored record untouched, when the app id is
    /// already present.
    fn insert_app(&self, app: &ParsedApp) -> StorageResult<bool>;

    /// Case-insensitive substring search over app names
    fn search_apps(&self, term: &str) -> StorageResult<Vec<AppSummary>>;

    /// Loads one app with all of its sub-records
    fn load_app(&self, app_id: &str) -> StorageResult<Option<ParsedApp>>;

    /// Row counts for statistics
    fn counts(&self) -> StorageResult<StorageCounts>;
}
