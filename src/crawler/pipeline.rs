//! Detail pipeline: fetch, extract and store every queued detail page
//!
//! A fixed pool of `min(K, pending)` worker tasks drains a shared in-memory
//! queue built from a snapshot of the link store, so at most K items are in
//! flight at once. One item's failure is logged and recorded against its
//! link; it never stops the other workers.

use crate::crawler::fetcher::PageFetcher;
use crate::extract::extract;
use crate::storage::{FailureOutcome, LinkStore, RecordStore};
use crate::HarvestError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// Totals of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// New app records written
    pub stored: usize,
    /// Pages whose app was already stored (link removed, record untouched)
    pub duplicates: usize,
    /// Items that failed and stay queued or were quarantined
    pub failed: usize,
    /// Failed items that reached the attempt limit on this run
    pub quarantined: usize,
}

impl PipelineSummary {
    fn merge(&mut self, other: &PipelineSummary) {
        self.stored += other.stored;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
        self.quarantined += other.quarantined;
    }
}

enum ItemOutcome {
    Stored,
    Duplicate,
}

type WorkQueue = Arc<Mutex<VecDeque<String>>>;

/// Drains the link store into the record store with bounded concurrency
pub struct DetailPipeline<S> {
    fetcher: Arc<dyn PageFetcher>,
    storage: Arc<S>,
    max_concurrent: usize,
    max_attempts: u32,
}

impl<S> DetailPipeline<S>
where
    S: LinkStore + RecordStore + Send + Sync + 'static,
{
    /// Creates a pipeline with at most `max_concurrent` items in flight
    ///
    /// Failed links are never quarantined unless
    /// [`with_max_attempts`](Self::with_max_attempts) sets a limit.
    pub fn new(fetcher: Arc<dyn PageFetcher>, storage: Arc<S>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            storage,
            max_concurrent: max_concurrent.max(1),
            max_attempts: 0,
        }
    }

    /// Quarantines a link once it has failed `max_attempts` times (0 disables)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Processes every link pending at the time of the call
    ///
    /// # Errors
    ///
    /// Only a failure to read the link queue is returned; per-item failures
    /// are counted in the summary.
    pub async fn run(&self) -> Result<PipelineSummary, HarvestError> {
        let links = self.storage.list_links()?;
        if links.is_empty() {
            tracing::info!("No pending detail links");
            return Ok(PipelineSummary::default());
        }

        let workers = self.max_concurrent.min(links.len());
        tracing::info!("Processing {} detail links with {} workers", links.len(), workers);

        let queue: WorkQueue = Arc::new(Mutex::new(VecDeque::from(links)));
        let mut tasks = JoinSet::new();

        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let fetcher = Arc::clone(&self.fetcher);
            let storage = Arc::clone(&self.storage);
            let max_attempts = self.max_attempts;

            tasks.spawn(async move {
                let mut tally = PipelineSummary::default();

                while let Some(url) = next_link(&queue) {
                    match process_link(fetcher.as_ref(), storage.as_ref(), &url).await {
                        Ok(ItemOutcome::Stored) => tally.stored += 1,
                        Ok(ItemOutcome::Duplicate) => tally.duplicates += 1,
                        Err(e) => {
                            tally.failed += 1;
                            tracing::warn!("Failed to process {}: {}", url, e);
                            if record_failure(storage.as_ref(), &url, &e, max_attempts) {
                                tally.quarantined += 1;
                            }
                        }
                    }
                }

                tracing::debug!("Detail worker {} finished", worker_id);
                tally
            });
        }

        let mut summary = PipelineSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(tally) => summary.merge(&tally),
                Err(e) => tracing::error!("Detail worker aborted: {}", e),
            }
        }

        tracing::info!(
            "Detail pipeline done: {} stored, {} already stored, {} failed ({} quarantined)",
            summary.stored,
            summary.duplicates,
            summary.failed,
            summary.quarantined
        );

        Ok(summary)
    }
}

fn next_link(queue: &WorkQueue) -> Option<String> {
    match queue.lock() {
        Ok(mut pending) => pending.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

async fn process_link<S>(fetcher: &dyn PageFetcher, storage: &S, url: &str) -> Result<ItemOutcome, HarvestError>
where
    S: LinkStore + RecordStore,
{
    let body = fetcher.fetch(url).await?;
    let app = extract(&body)?;

    let stored = storage.insert_app(&app)?;
    storage.remove_link(url)?;

    if stored {
        tracing::debug!("Stored app {} ({}) from {}", app.record.app_id, app.record.app_name, url);
        Ok(ItemOutcome::Stored)
    } else {
        tracing::debug!("App {} already stored, dropping {}", app.record.app_id, url);
        Ok(ItemOutcome::Duplicate)
    }
}

/// Records the failure against the link; returns true if it was quarantined
fn record_failure<S: LinkStore>(storage: &S, url: &str, error: &HarvestError, max_attempts: u32) -> bool {
    match storage.record_failure(url, &error.to_string(), max_attempts) {
        Ok(FailureOutcome::Quarantined { attempts }) => {
            tracing::warn!("Quarantined {} after {} attempts", url, attempts);
            true
        }
        Ok(FailureOutcome::Retained { attempts }) => {
            tracing::debug!("{} stays queued ({} attempts)", url, attempts);
            false
        }
        Err(e) => {
            tracing::warn!("Could not record failure for {}: {}", url, e);
            false
        }
    }
}
