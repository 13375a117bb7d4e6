//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Appstore-Harvest
//! database: the walk checkpoints, the detail-link queue and the app records.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Resume cursor, one row per category
CREATE TABLE IF NOT EXISTS crawl_progress (
    url TEXT PRIMARY KEY,
    letter TEXT NOT NULL,
    page INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

-- Detail pages waiting to be processed
CREATE TABLE IF NOT EXISTS pending_links (
    url TEXT PRIMARY KEY,
    discovered_at TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    last_error TEXT
);

-- Detail pages that failed too many times
CREATE TABLE IF NOT EXISTS quarantined_links (
    url TEXT PRIMARY KEY,
    attempts INTEGER NOT NULL,
    last_error TEXT,
    quarantined_at TEXT NOT NULL
);

-- One row per app, written once
CREATE TABLE IF NOT EXISTS app_store_main (
    app_id TEXT PRIMARY KEY,
    app_name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    published_date TEXT NOT NULL DEFAULT '',
    last_updated_date TEXT NOT NULL DEFAULT '',
    version TEXT NOT NULL DEFAULT '',
    size TEXT NOT NULL DEFAULT '',
    seller TEXT NOT NULL DEFAULT '',
    copyright TEXT NOT NULL DEFAULT '',
    app_rating TEXT NOT NULL DEFAULT '',
    compatibility TEXT NOT NULL DEFAULT '',
    current_version_rating_value TEXT NOT NULL DEFAULT '',
    current_version_rating_count TEXT NOT NULL DEFAULT '',
    all_versions_rating_value TEXT NOT NULL DEFAULT '',
    all_versions_rating_count TEXT NOT NULL DEFAULT '',
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_app_name ON app_store_main(app_name);

CREATE TABLE IF NOT EXISTS app_store_languages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id TEXT NOT NULL REFERENCES app_store_main(app_id),
    language_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_languages_app ON app_store_languages(app_id);

CREATE TABLE IF NOT EXISTS app_store_in_app_purchases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id TEXT NOT NULL REFERENCES app_store_main(app_id),
    purchase_order INTEGER NOT NULL,
    title TEXT NOT NULL,
    price TEXT NOT NULL,
    UNIQUE(app_id, purchase_order)
);

CREATE TABLE IF NOT EXISTS app_store_reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id TEXT NOT NULL REFERENCES app_store_main(app_id),
    title TEXT NOT NULL,
    rating TEXT NOT NULL,
    user TEXT NOT NULL,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_app ON app_store_reviews(app_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
