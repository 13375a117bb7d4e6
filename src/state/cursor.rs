//! Resume cursor for walking one category's listing pages
//!
//! Letters run `A..=Z`, pages are 1-based. The cursor always names the next
//! listing page that has not been processed yet.

use crate::HarvestError;
use std::fmt;

/// First letter of every walk
pub const FIRST_LETTER: char = 'A';

/// Last letter of every walk
pub const LAST_LETTER: char = 'Z';

/// The (letter, page) position of a category walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCursor {
    pub category_url: String,
    letter: char,
    page: u32,
}

impl CrawlCursor {
    /// Builds a cursor, rejecting letters outside `A..=Z` and page 0
    pub fn new(category_url: impl Into<String>, letter: char, page: u32) -> Result<Self, HarvestError> {
        if !is_valid_letter(letter) {
            return Err(HarvestError::Cursor(format!(
                "letter must be A-Z, got {:?}",
                letter
            )));
        }

        if page == 0 {
            return Err(HarvestError::Cursor("page must be >= 1".to_string()));
        }

        Ok(Self {
            category_url: category_url.into(),
            letter,
            page,
        })
    }

    /// The cursor of a category that has never been walked
    pub fn start(category_url: impl Into<String>) -> Self {
        Self {
            category_url: category_url.into(),
            letter: FIRST_LETTER,
            page: 1,
        }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Transition taken when the current page yielded links
    pub fn next_page(&self) -> Self {
        Self {
            category_url: self.category_url.clone(),
            letter: self.letter,
            page: self.page + 1,
        }
    }

    /// Transition taken when the current page was empty
    ///
    /// Returns None once the walk has moved past the last letter.
    pub fn next_letter(&self) -> Option<Self> {
        if self.letter >= LAST_LETTER {
            return None;
        }

        let next = char::from(self.letter as u8 + 1);
        Some(Self {
            category_url: self.category_url.clone(),
            letter: next,
            page: 1,
        })
    }
}

impl fmt::Display for CrawlCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}:{}", self.category_url, self.letter, self.page)
    }
}

fn is_valid_letter(letter: char) -> bool {
    letter.is_ascii_uppercase()
}
