//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlCursor`: the durable (letter, page) resume point of a category walk

mod cursor;

pub use cursor::{CrawlCursor, FIRST_LETTER, LAST_LETTER};
