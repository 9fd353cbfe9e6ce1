//! HTML link extraction
//!
//! The scraper-backed [`LinkExtractor`] used by the binary. Only `<a href>`
//! targets count as links; hrefs are resolved against the page URL and
//! anything that is not HTTP(S) after resolution is skipped.

use super::traits::{LinkExtractor, Page};
use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

/// [`LinkExtractor`] that parses the page body as HTML.
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, page: &Page) -> Result<Vec<String>, ExtractError> {
        let base = Url::parse(&page.url).map_err(|e| ExtractError::BaseUrl(e.to_string()))?;
        let selector = Selector::parse("a[href]").map_err(|_| ExtractError::Selector)?;

        let document = Html::parse_document(&page.body);
        let mut links = Vec::new();
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, &base) {
                    links.push(absolute);
                }
            }
        }
        Ok(links)
    }
}

/// Resolves an href to an absolute URL, or None if it should be skipped:
/// scripting/contact schemes, data URIs, fragment-only anchors, invalid
/// URLs, and anything that is not HTTP(S) after resolution.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(absolute) => {
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(absolute.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
