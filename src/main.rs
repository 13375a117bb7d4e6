//! Appstore-Harvest main entry point
//!
//! This is the command-line interface for the storefront catalog harvester.

use anyhow::Context;
use appstore_harvest::config::{load_config_with_hash, Config};
use appstore_harvest::crawler::{run_harvest, HarvestOptions, HarvestReport};
use appstore_harvest::output::{
    format_app_detail, format_quarantined, format_search_results, load_statistics, print_statistics,
};
use appstore_harvest::storage::{LinkStore, RecordStore, SqliteStorage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Appstore-Harvest: a resumable storefront catalog crawler
///
/// Walks the A-Z listing pages of each configured category, queues every
/// app detail page it finds, then fetches and stores one record per app.
/// Interrupted runs resume where they stopped.
#[derive(Parser, Debug)]
#[command(name = "appstore-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable storefront catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only walk category listings and queue detail links
    #[arg(long, conflicts_with_all = ["details_only", "stats", "search", "show", "dry_run"])]
    walk_only: bool,

    /// Only process already queued detail links
    #[arg(long, conflicts_with_all = ["walk_only", "stats", "search", "show", "dry_run", "fresh", "category"])]
    details_only: bool,

    /// Restart the walk of each category from letter A, page 1
    #[arg(long)]
    fresh: bool,

    /// Walk only this category URL (repeatable); defaults to every configured category
    #[arg(long, value_name = "URL")]
    category: Vec<String>,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "search", "show"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["search", "show"])]
    stats: bool,

    /// Search stored apps by name and exit
    #[arg(long, value_name = "TERM", conflicts_with = "show")]
    search: Option<String>,

    /// Show one stored app and exit
    #[arg(long, value_name = "APP_ID")]
    show: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.category);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(term) = &cli.search {
        handle_search(&config, term)?;
    } else if let Some(app_id) = &cli.show {
        handle_show(&config, app_id)?;
    } else {
        let options = HarvestOptions {
            walk: !cli.details_only,
            details: !cli.walk_only,
            fresh: cli.fresh,
            categories: cli.category.clone(),
        };
        handle_harvest(config, &options).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("appstore_harvest=info,warn"),
            1 => EnvFilter::new("appstore_harvest=debug,info"),
            2 => EnvFilter::new("appstore_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_storage(config: &Config) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open database {}", config.output.database_path))
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, categories: &[String]) {
    println!("=== Appstore-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max concurrent details: {}", config.crawler.max_concurrent_details);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    match config.crawler.max_attempts {
        0 => println!("  Failed links: retried forever"),
        n => println!("  Failed links: quarantined after {} attempts", n),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.identity);

    println!("\nDetail URL pattern:");
    println!("  {}", config.catalog.detail_url_pattern);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let selected: Vec<&str> = if categories.is_empty() {
        config.categories.iter().map(|c| c.url.as_str()).collect()
    } else {
        categories.iter().map(String::as_str).collect()
    };

    println!("\nCategories ({}):", selected.len());
    for url in &selected {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);
    print!("{}", format_quarantined(&storage.list_quarantined()?));

    Ok(())
}

/// Handles the --search mode
fn handle_search(config: &Config, term: &str) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let hits = storage.search_apps(term)?;
    print!("{}", format_search_results(term, &hits));
    Ok(())
}

/// Handles the --show mode
fn handle_show(config: &Config, app_id: &str) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match storage.load_app(app_id)? {
        Some(app) => print!("{}", format_app_detail(&app)),
        None => anyhow::bail!("no stored app with id {}", app_id),
    }
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, options: &HarvestOptions) -> anyhow::Result<()> {
    if options.walk && config.categories.is_empty() && options.categories.is_empty() {
        tracing::warn!("No categories configured; nothing to walk");
    }

    let report = run_harvest(config, options).await.context("harvest failed")?;
    log_report(&report);

    let failed = report.failed_walks();
    if failed > 0 {
        anyhow::bail!("{} category walk(s) stopped early; rerun to resume", failed);
    }

    Ok(())
}

fn log_report(report: &HarvestReport) {
    for walk in &report.walks {
        if let Ok(summary) = &walk.result {
            tracing::info!(
                "{}: {} pages, {} new links",
                walk.category_url,
                summary.pages_fetched,
                summary.links_enqueued
            );
        }
    }

    if let Some(pipeline) = &report.pipeline {
        tracing::info!(
            "Details: {} stored, {} duplicates, {} failed, {} quarantined",
            pipeline.stored,
            pipeline.duplicates,
            pipeline.failed,
            pipeline.quarantined
        );
    }
}
