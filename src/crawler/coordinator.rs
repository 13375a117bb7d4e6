//! Harvest coordinator - wires configuration, storage and the two stages
//!
//! A harvest is two decoupled stages joined by the durable link queue:
//! 1. walk every selected category, queueing detail links
//! 2. drain the queue through the detail pipeline
//!
//! Either stage can run alone; the queue and the walk checkpoints carry all
//! state between invocations.

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::pipeline::{DetailPipeline, PipelineSummary};
use crate::crawler::walker::{CategoryWalker, WalkSummary};
use crate::state::CrawlCursor;
use crate::storage::{ProgressStore, SqliteStorage};
use crate::url::DetailUrlMatcher;
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Which stages to run and over which categories
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub walk: bool,
    pub details: bool,
    /// Reset the cursor of every walked category to its first page
    pub fresh: bool,
    /// Categories to walk; empty means every configured category
    pub categories: Vec<String>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            walk: true,
            details: true,
            fresh: false,
            categories: Vec::new(),
        }
    }
}

/// Outcome of one category walk
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category_url: String,
    pub result: Result<WalkSummary, HarvestError>,
}

/// Everything a harvest did
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub walks: Vec<CategoryOutcome>,
    pub pipeline: Option<PipelineSummary>,
}

impl HarvestReport {
    /// Number of categories whose walk stopped on an error
    pub fn failed_walks(&self) -> usize {
        self.walks.iter().filter(|w| w.result.is_err()).count()
    }
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    storage: Arc<SqliteStorage>,
    fetcher: Arc<dyn PageFetcher>,
    matcher: DetailUrlMatcher,
}

impl Coordinator {
    /// Opens the configured database and builds the HTTP fetcher
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let fetcher = HttpFetcher::new(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Self::with_parts(config, Arc::new(storage), Arc::new(fetcher))
    }

    /// Builds a coordinator around an existing store and fetcher
    pub fn with_parts(
        config: Config,
        storage: Arc<SqliteStorage>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, HarvestError> {
        let matcher = DetailUrlMatcher::new(&config.catalog.detail_url_pattern)?;

        Ok(Self {
            config: Arc::new(config),
            storage,
            fetcher,
            matcher,
        })
    }

    pub fn storage(&self) -> &Arc<SqliteStorage> {
        &self.storage
    }

    /// Runs the selected stages
    ///
    /// A failed category walk is logged and reported; the remaining
    /// categories and the detail stage still run. Only a failure to reach
    /// the store before any work starts is returned as an error.
    pub async fn run(&self, options: &HarvestOptions) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport::default();

        if options.walk {
            let walker = CategoryWalker::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.storage),
                self.matcher.clone(),
            );

            for category_url in self.categories(options) {
                if options.fresh {
                    tracing::info!("Resetting cursor of {}", category_url);
                    self.storage.save_cursor(&CrawlCursor::start(category_url.as_str()))?;
                }

                let result = walker.walk(&category_url).await;
                if let Err(e) = &result {
                    tracing::error!("Walk of {} stopped: {}", category_url, e);
                }
                report.walks.push(CategoryOutcome {
                    category_url,
                    result,
                });
            }
        }

        if options.details {
            let pipeline = DetailPipeline::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.storage),
                self.config.crawler.max_concurrent_details,
            )
            .with_max_attempts(self.config.crawler.max_attempts);

            report.pipeline = Some(pipeline.run().await?);
        }

        Ok(report)
    }

    fn categories(&self, options: &HarvestOptions) -> Vec<String> {
        if options.categories.is_empty() {
            self.config.categories.iter().map(|c| c.url.clone()).collect()
        } else {
            options.categories.clone()
        }
    }
}

/// Runs a complete harvest with the configured HTTP fetcher
///
/// # Example
///
/// ```no_run
/// use appstore_harvest::config::load_config;
/// use appstore_harvest::crawler::{run_harvest, HarvestOptions};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(config, &HarvestOptions::default()).await?;
/// println!("{} categories walked", report.walks.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config, options: &HarvestOptions) -> Result<HarvestReport, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(options).await
}
