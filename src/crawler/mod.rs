//! Crawler module
//!
//! The concurrency engine and its collaborators:
//! - layer-by-layer traversal with a dynamic completion barrier
//! - per-host admission over fixed-capacity download/extraction pools
//! - the fetch and link-extraction capability seams plus their HTTP/HTML
//!   implementations

mod barrier;
mod dispatcher;
mod engine;
mod fetcher;
mod host_queue;
mod parser;
mod traits;

pub use engine::{CrawlReport, Crawler};
pub use fetcher::{build_http_client, HttpFetcher};
pub use parser::HtmlLinkExtractor;
pub use traits::{Fetcher, LinkExtractor, Page};
