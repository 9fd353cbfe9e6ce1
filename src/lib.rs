//! Depthwise: a layered breadth-first web crawler
//!
//! This crate crawls outward from a seed URL one depth layer at a time,
//! capping concurrency along three independent axes: total simultaneous
//! downloads, total simultaneous link extractions, and simultaneous
//! downloads to any single host. A layer must drain completely before the
//! next one starts.

pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Failure recorded against a single URL during a crawl.
///
/// No variant aborts the traversal; the engine collects these per URL and
/// returns them in the final [`CrawlReport`](crawler::CrawlReport).
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("URL has no host: {url}")]
    MalformedHost { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request timeout for {url}")]
    Timeout { url: String },
}

/// Link-extraction failure on an already-downloaded page.
///
/// The engine drops these without recording an error; the page still counts
/// as downloaded.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid base URL for link resolution: {0}")]
    BaseUrl(String),

    #[error("failed to build link selector")]
    Selector,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Limits;
pub use crawler::{
    CrawlReport, Crawler, Fetcher, HtmlLinkExtractor, HttpFetcher, LinkExtractor, Page,
};
pub use url::host_of;
