//! HTTP fetcher implementation
//!
//! The reqwest-backed [`Fetcher`] used by the binary. Non-2xx statuses and
//! transport failures are classified into [`CrawlError`] variants; the
//! engine records them per URL without looking inside.

use super::traits::{Fetcher, Page};
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// User agent sent when the caller does not supply a client of their own.
const USER_AGENT: &str = concat!("depthwise/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with the crawler's standard configuration.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a shared reqwest [`Client`].
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default client configuration.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(USER_AGENT)?,
        })
    }

    /// Creates a fetcher around a caller-configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Keep the post-redirect URL so relative links resolve against the
        // page that actually answered.
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(Page {
            url: final_url,
            body,
        })
    }
}

fn classify(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
