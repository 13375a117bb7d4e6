//! Category walker: letters `A..=Z`, pages `1..` until a page has no links
//!
//! The walk is sequential. After every listing page the next position is
//! checkpointed, so an interrupted walk resumes at the first page that was
//! not fully processed.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::extract_detail_links;
use crate::storage::{LinkStore, ProgressStore};
use crate::url::{listing_url, normalize_category_url, DetailUrlMatcher};
use crate::HarvestError;
use std::sync::Arc;

/// Totals of one walk invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Listing pages fetched
    pub pages_fetched: usize,
    /// Detail links found on those pages
    pub links_discovered: usize,
    /// Links that were not already queued
    pub links_enqueued: usize,
}

/// Walks the listing pages of a category and queues every detail link
pub struct CategoryWalker<S> {
    fetcher: Arc<dyn PageFetcher>,
    storage: Arc<S>,
    matcher: DetailUrlMatcher,
}

impl<S> CategoryWalker<S>
where
    S: ProgressStore + LinkStore,
{
    pub fn new(fetcher: Arc<dyn PageFetcher>, storage: Arc<S>, matcher: DetailUrlMatcher) -> Self {
        Self {
            fetcher,
            storage,
            matcher,
        }
    }

    /// Walks `category_url` from its stored cursor through letter `Z`
    ///
    /// The cursor is keyed by `category_url` exactly as given. Listing URLs
    /// are built from its normalized form (query and fragment removed).
    ///
    /// # Errors
    ///
    /// A failed listing fetch aborts the walk with [`HarvestError::Transport`]
    /// and leaves the checkpoint on the failed page. Storage failures abort
    /// it the same way.
    pub async fn walk(&self, category_url: &str) -> Result<WalkSummary, HarvestError> {
        let base = normalize_category_url(category_url)?;
        let mut cursor = self.storage.load_cursor(category_url)?;
        let mut summary = WalkSummary::default();

        tracing::info!("Walking {} from {}:{}", base, cursor.letter(), cursor.page());

        loop {
            let page_url = listing_url(&base, cursor.letter(), cursor.page());
            let body = self.fetcher.fetch(page_url.as_str()).await?;
            summary.pages_fetched += 1;

            let links = extract_detail_links(&body, &page_url, &self.matcher);

            if links.is_empty() {
                tracing::debug!("No links on {}", page_url);
                match cursor.next_letter() {
                    Some(next) => {
                        self.storage.save_cursor(&next)?;
                        cursor = next;
                    }
                    None => break,
                }
                continue;
            }

            let added = self.storage.enqueue_links(&links)?;
            summary.links_discovered += links.len();
            summary.links_enqueued += added;

            cursor = cursor.next_page();
            self.storage.save_cursor(&cursor)?;

            tracing::info!(
                "{}: {} links ({} new), next {}:{}",
                page_url,
                links.len(),
                added,
                cursor.letter(),
                cursor.page()
            );
        }

        tracing::info!(
            "Finished walking {}: {} pages, {} links ({} new)",
            base,
            summary.pages_fetched,
            summary.links_discovered,
            summary.links_enqueued
        );

        Ok(summary)
    }
}
