//! Capability seams consumed by the traversal engine
//!
//! The engine schedules work; it does not know how pages are fetched or how
//! links are found in them. Both capabilities are supplied through these
//! traits, which also makes the engine testable against scripted fakes.

use crate::{CrawlError, ExtractError};
use async_trait::async_trait;

/// A successfully downloaded page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL of the page, used as the base for resolving its links
    pub url: String,

    /// Raw page body
    pub body: String,
}

/// Downloads a page for the engine.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`. The engine stores the error against the URL without
    /// interpreting it further.
    async fn fetch(&self, url: &str) -> Result<Page, CrawlError>;
}

/// Discovers outgoing links on a downloaded page.
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute URLs the page links to. The engine discards
    /// the error case: an unparseable page contributes no links and is not
    /// a download failure.
    fn extract_links(&self, page: &Page) -> Result<Vec<String>, ExtractError>;
}
