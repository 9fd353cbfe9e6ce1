use crate::CrawlError;
use url::Url;

/// Extracts the host from a URL string, lowercased.
///
/// The port is not part of the host identity: `example.com:8080` and
/// `example.com` share one admission queue.
///
/// # Examples
///
/// ```
/// use depthwise::url::host_of;
///
/// assert_eq!(host_of("https://Example.COM/path").unwrap(), "example.com");
/// assert!(host_of("not a url").is_err());
/// ```
pub fn host_of(url: &str) -> Result<String, CrawlError> {
    let parsed = Url::parse(url).map_err(|_| CrawlError::MalformedHost {
        url: url.to_string(),
    })?;

    match parsed.host_str() {
        Some(host) => Ok(host.to_lowercase()),
        None => Err(CrawlError::MalformedHost {
            url: url.to_string(),
        }),
    }
}
