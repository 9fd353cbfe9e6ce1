//! Traversal engine
//!
//! Drives the layer-by-layer crawl: claims URLs exactly once, pushes
//! download jobs through per-host admission, lets successful downloads
//! spawn extraction work for the next layer, and blocks on the layer
//! barrier until everything a layer spawned has drained.

use super::barrier::LayerBarrier;
use super::dispatcher::Dispatcher;
use super::host_queue::HostQueues;
use super::traits::{Fetcher, LinkExtractor};
use crate::config::Limits;
use crate::url::host_of;
use crate::CrawlError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Final outcome of one [`Crawler::download`] call.
///
/// `downloaded` and the keys of `errors` are always disjoint: a URL that
/// failed is not counted as downloaded.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// URLs downloaded successfully
    pub downloaded: HashSet<String>,

    /// Failure reason per URL that could not be downloaded
    pub errors: HashMap<String, CrawlError>,
}

/// State shared by all tasks of one `download` call.
///
/// `visited` is the single dedup point: inserting is the claim, and a URL
/// whose claim fails is never submitted. `frontier` collects next-layer
/// candidates during a layer and is only drained after the barrier
/// releases, so it sees no concurrent read/write overlap.
#[derive(Default)]
struct CrawlState {
    visited: Mutex<HashSet<String>>,
    frontier: Mutex<Vec<String>>,
    errors: Mutex<HashMap<String, CrawlError>>,
}

/// Breadth-first crawler with bounded download, extraction, and per-host
/// concurrency.
///
/// The two worker pools and the host admission state are created once here
/// and live until [`close`](Crawler::close); `download` may be called any
/// number of times before that.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    downloads: Arc<Dispatcher>,
    extracts: Arc<Dispatcher>,
    hosts: Arc<HostQueues>,
}

impl Crawler {
    /// Creates the engine and spawns both worker pools.
    ///
    /// Must be called within a Tokio runtime. `limits` should already be
    /// validated; a zero-sized pool never runs anything.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        limits: &Limits,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            downloads: Arc::new(Dispatcher::new("download", limits.downloads)),
            extracts: Arc::new(Dispatcher::new("extract", limits.extractors)),
            hosts: Arc::new(HostQueues::new(limits.per_host)),
        }
    }

    /// Crawls breadth-first from `seed`, visiting at most `max_depth`
    /// layers, and returns the best-effort result.
    ///
    /// Each distinct URL is downloaded at most once per call. No layer
    /// N+1 download starts before every download and extraction spawned
    /// in layer N has finished. `max_depth` of zero performs no work.
    pub async fn download(&self, seed: &str, max_depth: usize) -> CrawlReport {
        let state = Arc::new(CrawlState::default());
        state.frontier.lock().unwrap().push(seed.to_string());

        for layer in 0..max_depth {
            let current: Vec<String> = std::mem::take(&mut *state.frontier.lock().unwrap());
            if current.is_empty() {
                break;
            }
            tracing::debug!(layer, candidates = current.len(), "starting layer");

            let barrier = Arc::new(LayerBarrier::new());
            // Sentinel registration held while this loop enumerates the
            // layer, so in-flight tasks cannot drive the count to zero
            // before submission is complete.
            barrier.register();
            for url in current {
                if state.visited.lock().unwrap().insert(url.clone()) {
                    self.submit_download(url, max_depth - layer, &state, &barrier);
                }
            }
            barrier.arrive();
            barrier.wait().await;
        }

        let visited = state.visited.lock().unwrap();
        let errors = std::mem::take(&mut *state.errors.lock().unwrap());
        let downloaded: HashSet<String> = visited
            .iter()
            .filter(|url| !errors.contains_key(*url))
            .cloned()
            .collect();

        tracing::info!(
            downloaded = downloaded.len(),
            failed = errors.len(),
            "crawl finished"
        );
        CrawlReport { downloaded, errors }
    }

    /// Builds the download job for one claimed URL and hands it to the
    /// host admission queue. URLs without a usable host are recorded as
    /// failed and never queued.
    fn submit_download(
        &self,
        url: String,
        remaining: usize,
        state: &Arc<CrawlState>,
        barrier: &Arc<LayerBarrier>,
    ) {
        let host = match host_of(&url) {
            Ok(host) => host,
            Err(e) => {
                state.errors.lock().unwrap().insert(url, e);
                return;
            }
        };

        barrier.register();
        let fetcher = Arc::clone(&self.fetcher);
        let extractor = Arc::clone(&self.extractor);
        let extracts = Arc::clone(&self.extracts);
        let downloads = Arc::clone(&self.downloads);
        let hosts = Arc::clone(&self.hosts);
        let state = Arc::clone(state);
        let barrier = Arc::clone(barrier);

        let job_host = host.clone();
        let job = async move {
            match fetcher.fetch(&url).await {
                Ok(page) => {
                    // The leaf layer needs no links; only spawn extraction
                    // while there is depth remaining. Registration must
                    // precede this task's own arrival below.
                    if remaining > 1 {
                        barrier.register();
                        let state = Arc::clone(&state);
                        let barrier = Arc::clone(&barrier);
                        extracts.submit(Box::pin(async move {
                            match extractor.extract_links(&page) {
                                Ok(links) => {
                                    state.frontier.lock().unwrap().extend(links);
                                }
                                Err(e) => {
                                    tracing::debug!(
                                        "dropping links of unparseable page {}: {}",
                                        page.url,
                                        e
                                    );
                                }
                            }
                            barrier.arrive();
                        }));
                    }
                }
                Err(e) => {
                    state.errors.lock().unwrap().insert(url, e);
                }
            }
            barrier.arrive();
            hosts.complete(&job_host, &downloads);
        };

        self.hosts.enqueue(&host, Box::pin(job), &self.downloads);
    }

    /// Shuts down both worker pools, waiting a bounded grace period for
    /// in-flight work. Safe to call more than once.
    pub async fn close(&self) {
        self.downloads.close().await;
        self.extracts.close().await;
    }
}
