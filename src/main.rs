//! Depthwise main entry point
//!
//! Command-line surface over the crawl engine: parse limits, run one
//! crawl, print the report.

use anyhow::Context;
use clap::Parser;
use depthwise::config::{load_limits, Limits};
use depthwise::{Crawler, HtmlLinkExtractor, HttpFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Depthwise: a layered breadth-first web crawler
///
/// Crawls outward from a seed URL one depth layer at a time, capping
/// concurrent downloads globally and per host.
#[derive(Parser, Debug)]
#[command(name = "depthwise")]
#[command(version)]
#[command(about = "A layered breadth-first web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Traversal depth
    #[arg(value_name = "DEPTH")]
    depth: Option<usize>,

    /// Download worker pool size
    #[arg(value_name = "DOWNLOADS")]
    downloads: Option<usize>,

    /// Extraction worker pool size
    #[arg(value_name = "EXTRACTORS")]
    extractors: Option<usize>,

    /// Maximum concurrent downloads to a single host
    #[arg(value_name = "PER_HOST")]
    per_host: Option<usize>,

    /// TOML limits file; positional values override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
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

    let limits = resolve_limits(&cli)?;
    limits.validate()?;

    let fetcher = Arc::new(HttpFetcher::new().context("building HTTP client")?);
    let crawler = Crawler::new(fetcher, Arc::new(HtmlLinkExtractor), &limits);

    tracing::info!(
        url = %cli.url,
        depth = limits.depth,
        downloads = limits.downloads,
        extractors = limits.extractors,
        per_host = limits.per_host,
        "starting crawl"
    );

    let report = crawler.download(&cli.url, limits.depth).await;
    crawler.close().await;

    println!("Successfully downloaded: {}", report.downloaded.len());
    let mut downloaded: Vec<&String> = report.downloaded.iter().collect();
    downloaded.sort();
    for url in downloaded {
        println!("{}", url);
    }

    if !report.errors.is_empty() {
        eprintln!("{} errors occurred while downloading:", report.errors.len());
        let mut failed: Vec<_> = report.errors.iter().collect();
        failed.sort_by(|a, b| a.0.cmp(b.0));
        for (url, error) in failed {
            eprintln!("    url: {}\n    {}", url, error);
        }
    }

    Ok(())
}

/// Merges the limits file (if any) with positional overrides.
fn resolve_limits(cli: &Cli) -> anyhow::Result<Limits> {
    let mut limits = match &cli.config {
        Some(path) => load_limits(path)
            .with_context(|| format!("loading limits from {}", path.display()))?,
        None => Limits::default(),
    };

    if let Some(depth) = cli.depth {
        limits.depth = depth;
    }
    if let Some(downloads) = cli.downloads {
        limits.downloads = downloads;
    }
    if let Some(extractors) = cli.extractors {
        limits.extractors = extractors;
    }
    if let Some(per_host) = cli.per_host {
        limits.per_host = per_host;
    }

    Ok(limits)
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depthwise=info,warn"),
            1 => EnvFilter::new("depthwise=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
