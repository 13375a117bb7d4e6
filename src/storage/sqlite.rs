//! SQLite storage implementation
//!
//! One [`SqliteStorage`] implements all three store traits. It owns its
//! connection behind a mutex; every trait method holds the lock for exactly
//! one logical operation, and multi-row writes run inside a transaction.

use crate::extract::{AppRecord, CustomerReview, InAppPurchase, LanguageEntry, ParsedApp};
use crate::state::CrawlCursor;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, ProgressStore, RecordStore, StorageError, StorageResult};
use crate::storage::{AppSummary, FailureOutcome, QuarantinedLink, StorageCounts};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const APP_COLUMNS: &str = "app_id, app_name, description, price, category, published_date, \
     last_updated_date, version, size, seller, copyright, app_rating, compatibility, \
     current_version_rating_value, current_version_rating_count, \
     all_versions_rating_value, all_versions_rating_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl ProgressStore for SqliteStorage {
    fn load_cursor(&self, category_url: &str) -> StorageResult<CrawlCursor> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT letter, page FROM crawl_progress WHERE url = ?1",
                params![category_url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((letter, page)) => cursor_from_row(category_url, &letter, page),
            None => Ok(CrawlCursor::start(category_url)),
        }
    }

    fn save_cursor(&self, cursor: &CrawlCursor) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO crawl_progress (url, letter, page, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET
                letter = excluded.letter,
                page = excluded.page,
                updated_at = excluded.updated_at",
            params![
                cursor.category_url,
                cursor.letter().to_string(),
                cursor.page(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn list_cursors(&self) -> StorageResult<Vec<CrawlCursor>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT url, letter, page FROM crawl_progress ORDER BY url")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|(url, letter, page)| cursor_from_row(url, letter, *page))
            .collect()
    }
}

impl LinkStore for SqliteStorage {
    fn enqueue_links(&self, urls: &BTreeSet<String>) -> StorageResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO pending_links (url, discovered_at)
                 SELECT ?1, ?2
                 WHERE NOT EXISTS (SELECT 1 FROM quarantined_links WHERE url = ?1)",
            )?;
            for url in urls {
                added += stmt.execute(params![url, now])?;
            }
        }

        tx.commit()?;
        Ok(added)
    }

    fn list_links(&self) -> StorageResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT url FROM pending_links ORDER BY discovered_at, url")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    fn remove_link(&self, url: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM pending_links WHERE url = ?1", params![url])?;
        Ok(removed > 0)
    }

    fn record_failure(&self, url: &str, error: &str, max_attempts: u32) -> StorageResult<FailureOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE pending_links SET attempts = attempts + 1, last_error = ?2 WHERE url = ?1",
            params![url, error],
        )?;
        if updated == 0 {
            return Err(StorageError::UnknownLink(url.to_string()));
        }

        let attempts: u32 = tx.query_row(
            "SELECT attempts FROM pending_links WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;

        let outcome = if max_attempts > 0 && attempts >= max_attempts {
            tx.execute(
                "INSERT OR REPLACE INTO quarantined_links (url, attempts, last_error, quarantined_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![url, attempts, error, Utc::now().to_rfc3339()],
            )?;
            tx.execute("DELETE FROM pending_links WHERE url = ?1", params![url])?;
            FailureOutcome::Quarantined { attempts }
        } else {
            FailureOutcome::Retained { attempts }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn list_quarantined(&self) -> StorageResult<Vec<QuarantinedLink>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT url, attempts, last_error, quarantined_at FROM quarantined_links ORDER BY url",
        )?;
        let links = stmt
            .query_map([], |row| {
                Ok(QuarantinedLink {
                    url: row.get(0)?,
                    attempts: row.get(1)?,
                    last_error: row.get(2)?,
                    quarantined_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }
}

impl RecordStore for SqliteStorage {
    fn insert_app(&self, app: &ParsedApp) -> StorageResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let record = &app.record;

        let inserted = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO app_store_main ({}, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                APP_COLUMNS
            ),
            params![
                record.app_id,
                record.app_name,
                record.description,
                record.price,
                record.category,
                record.published_date,
                record.last_updated_date,
                record.version,
                record.size,
                record.seller,
                record.copyright,
                record.app_rating,
                record.compatibility,
                record.current_version_rating_value,
                record.current_version_rating_count,
                record.all_versions_rating_value,
                record.all_versions_rating_count,
                Utc::now().to_rfc3339()
            ],
        )?;

        if inserted == 0 {
            return Ok(false);
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO app_store_languages (app_id, language_name) VALUES (?1, ?2)")?;
            for language in &app.languages {
                stmt.execute(params![record.app_id, language.language_name])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO app_store_in_app_purchases (app_id, purchase_order, title, price)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for purchase in &app.purchases {
                stmt.execute(params![record.app_id, purchase.order, purchase.title, purchase.price])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO app_store_reviews (app_id, title, rating, user, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for review in &app.reviews {
                stmt.execute(params![
                    record.app_id,
                    review.title,
                    review.rating,
                    review.user,
                    review.content
                ])?;
            }
        }

        tx.commit()?;
        Ok(true)
    }

    fn search_apps(&self, term: &str) -> StorageResult<Vec<AppSummary>> {
        let conn = self.lock()?;
        let pattern = format!("%{}%", escape_like(term.trim()));

        let mut stmt = conn.prepare(
            r"SELECT app_id, app_name, category, price FROM app_store_main
              WHERE app_name LIKE ?1 ESCAPE '\'
              ORDER BY app_name, app_id",
        )?;
        let hits = stmt
            .query_map(params![pattern], |row| {
                Ok(AppSummary {
                    app_id: row.get(0)?,
                    app_name: row.get(1)?,
                    category: row.get(2)?,
                    price: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hits)
    }

    fn load_app(&self, app_id: &str) -> StorageResult<Option<ParsedApp>> {
        let conn = self.lock()?;

        let record = conn
            .query_row(
                &format!("SELECT {} FROM app_store_main WHERE app_id = ?1", APP_COLUMNS),
                params![app_id],
                row_to_record,
            )
            .optional()?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT language_name FROM app_store_languages WHERE app_id = ?1 ORDER BY id",
        )?;
        let languages = stmt
            .query_map(params![app_id], |row| {
                Ok(LanguageEntry {
                    app_id: app_id.to_string(),
                    language_name: row.get(0)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT purchase_order, title, price FROM app_store_in_app_purchases
             WHERE app_id = ?1 ORDER BY purchase_order",
        )?;
        let purchases = stmt
            .query_map(params![app_id], |row| {
                Ok(InAppPurchase {
                    app_id: app_id.to_string(),
                    order: row.get(0)?,
                    title: row.get(1)?,
                    price: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT title, rating, user, content FROM app_store_reviews WHERE app_id = ?1 ORDER BY id",
        )?;
        let reviews = stmt
            .query_map(params![app_id], |row| {
                Ok(CustomerReview {
                    app_id: app_id.to_string(),
                    title: row.get(0)?,
                    rating: row.get(1)?,
                    user: row.get(2)?,
                    content: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ParsedApp {
            record,
            languages,
            purchases,
            reviews,
        }))
    }

    fn counts(&self) -> StorageResult<StorageCounts> {
        let conn = self.lock()?;
        Ok(StorageCounts {
            apps: count_rows(&conn, "app_store_main")?,
            languages: count_rows(&conn, "app_store_languages")?,
            purchases: count_rows(&conn, "app_store_in_app_purchases")?,
            reviews: count_rows(&conn, "app_store_reviews")?,
            pending_links: count_rows(&conn, "pending_links")?,
            quarantined_links: count_rows(&conn, "quarantined_links")?,
        })
    }
}

fn cursor_from_row(url: &str, letter: &str, page: i64) -> StorageResult<CrawlCursor> {
    let mut chars = letter.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return Err(StorageError::Corrupt(format!(
            "cursor for {} has letter {:?}",
            url, letter
        )));
    };

    let page = u32::try_from(page)
        .map_err(|_| StorageError::Corrupt(format!("cursor for {} has page {}", url, page)))?;

    CrawlCursor::new(url, letter, page).map_err(|e| StorageError::Corrupt(format!("{}: {}", url, e)))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AppRecord> {
    Ok(AppRecord {
        app_id: row.get(0)?,
        app_name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        published_date: row.get(5)?,
        last_updated_date: row.get(6)?,
        version: row.get(7)?,
        size: row.get(8)?,
        seller: row.get(9)?,
        copyright: row.get(10)?,
        app_rating: row.get(11)?,
        compatibility: row.get(12)?,
        current_version_rating_value: row.get(13)?,
        current_version_rating_count: row.get(14)?,
        all_versions_rating_value: row.get(15)?,
        all_versions_rating_count: row.get(16)?,
    })
}

fn count_rows(conn: &Connection, table: &str) -> StorageResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
