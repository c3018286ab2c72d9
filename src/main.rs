//! Sumi-Audit main entry point
//!
//! This is the command-line interface for the Sumi-Audit SEO crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sumi_audit::config::{load_config, Config};
use sumi_audit::output::generate_markdown_report;
use sumi_audit::{CrawlManager, CrawlOptions, CrawlState};
use tracing_subscriber::EnvFilter;

/// Sumi-Audit: a single-site SEO crawler
///
/// Sumi-Audit walks every internal page reachable from a seed URL, flags
/// on-page SEO issues by severity and scores the site from 0 to 100.
#[derive(Parser, Debug)]
#[command(name = "sumi-audit")]
#[command(version)]
#[command(about = "A single-site SEO crawler", long_about = None)]
struct Cli {
    /// Seed URL of the site to audit
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to record
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Delay between page fetches in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Skip image statistics and the missing alt text check
    #[arg(long)]
    no_images: bool,

    /// Do not record page load times
    #[arg(long)]
    no_performance: bool,

    /// Write the sitemap XML to this path
    #[arg(long, value_name = "PATH")]
    sitemap: Option<PathBuf>,

    /// Write the JSON export of the crawl to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write a markdown audit report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    let options = build_options(&cli, &config);
    let manager = CrawlManager::new();
    let id = manager.start_crawl(&cli.url, options)?;

    let state = run_until_complete(&manager, &id).await?;
    print_summary(&state);

    write_outputs(&cli, &config, &manager, &state)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_audit=info,warn"),
            1 => EnvFilter::new("sumi_audit=debug,info"),
            2 => EnvFilter::new("sumi_audit=trace,debug"),
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

/// Applies command-line overrides on top of the configuration file
fn build_options(cli: &Cli, config: &Config) -> CrawlOptions {
    let mut options = CrawlOptions::from_config(config);

    if let Some(max_pages) = cli.max_pages {
        options.max_depth = max_pages.max(1);
    }
    if let Some(delay) = cli.delay {
        options.request_delay = delay;
    }
    if let Some(user_agent) = &cli.user_agent {
        options.user_agent = user_agent.clone();
    }
    if cli.no_images {
        options.check_images = false;
    }
    if cli.no_performance {
        options.check_performance = false;
    }

    options
}

/// Polls the crawl every second until it finishes, cancelling it on Ctrl-C
async fn run_until_complete(manager: &CrawlManager, id: &str) -> anyhow::Result<CrawlState> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(status) = manager.get_crawl_status(id) else {
                    anyhow::bail!("Crawl {} disappeared", id);
                };
                if status.completed {
                    break;
                }
                tracing::info!(
                    "Crawled {}/{} pages{}",
                    status.page_count,
                    status.total_pages,
                    status
                        .current_url
                        .map(|url| format!(", next: {}", url))
                        .unwrap_or_default()
                );
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                tracing::warn!("Interrupted, finishing the current page");
                manager.cancel_crawl(id);
            }
        }
    }

    Ok(manager.wait_for_completion(id).await?)
}

/// Prints the headline numbers of a finished crawl
fn print_summary(state: &CrawlState) {
    println!("=== SEO Audit: {} ===\n", state.domain);
    if state.cancelled {
        println!("Crawl cancelled before completion\n");
    }
    println!("Score:         {}/100", state.score.unwrap_or(0));
    println!("Pages crawled: {}", state.page_count());
    println!("Critical:      {}", state.issue_totals.critical);
    println!("Important:     {}", state.issue_totals.important);
    println!("Opportunities: {}", state.issue_totals.opportunities);
}

/// Writes the sitemap, JSON export and report where requested
///
/// Command-line paths take precedence over the `[output]` section.
fn write_outputs(
    cli: &Cli,
    config: &Config,
    manager: &CrawlManager,
    state: &CrawlState,
) -> anyhow::Result<()> {
    let pick = |flag: &Option<PathBuf>, configured: &Option<String>| {
        flag.clone().or_else(|| configured.as_ref().map(PathBuf::from))
    };

    if let Some(path) = pick(&cli.sitemap, &config.output.sitemap_path) {
        manager.download_sitemap(&state.id, &path)?;
        print_written("Sitemap", &path);
    }
    if let Some(path) = pick(&cli.export, &config.output.export_path) {
        manager.export_crawl_data(&state.id, &path)?;
        print_written("Crawl data", &path);
    }
    if let Some(path) = pick(&cli.report, &config.output.report_path) {
        generate_markdown_report(state, &path)?;
        print_written("Report", &path);
    }

    Ok(())
}

fn print_written(what: &str, path: &Path) {
    println!("✓ {} written to: {}", what, path.display());
}
