//! Crawler module for catalog walking and detail processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - Listing-page link extraction
//! - The resumable category walker
//! - The bounded-concurrency detail pipeline
//! - Overall harvest coordination

mod coordinator;
mod fetcher;
mod parser;
mod pipeline;
mod walker;

pub use coordinator::{run_harvest, CategoryOutcome, Coordinator, HarvestOptions, HarvestReport};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use parser::extract_detail_links;
pub use pipeline::{DetailPipeline, PipelineSummary};
pub use walker::{CategoryWalker, WalkSummary};
