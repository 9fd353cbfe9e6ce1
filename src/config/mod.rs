//! Crawl limits configuration
//!
//! Limits come from the command line, from an optional TOML file, or from
//! the built-in defaults. Validation happens up front, before any pool is
//! created.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Default traversal depth.
pub const DEFAULT_DEPTH: usize = 1;
/// Default download worker pool size.
pub const DEFAULT_DOWNLOADS: usize = 16;
/// Default extraction worker pool size.
pub const DEFAULT_EXTRACTORS: usize = 16;
/// Default cap on concurrent downloads to one host.
pub const DEFAULT_PER_HOST: usize = 16;

/// Concurrency limits and the default traversal depth.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Traversal depth used when the command line does not supply one
    pub depth: usize,

    /// Download worker pool size
    pub downloads: usize,

    /// Extraction worker pool size
    pub extractors: usize,

    /// Maximum concurrent downloads to a single host
    #[serde(rename = "per-host")]
    pub per_host: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            downloads: DEFAULT_DOWNLOADS,
            extractors: DEFAULT_EXTRACTORS,
            per_host: DEFAULT_PER_HOST,
        }
    }
}

impl Limits {
    /// Checks that every limit is a positive number.
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("depth", self.depth),
            ("downloads", self.downloads),
            ("extractors", self.extractors),
            ("per-host", self.per_host),
        ];
        for (name, value) in fields {
            if value < 1 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Parses limits from TOML content and validates them.
pub fn parse_limits(content: &str) -> ConfigResult<Limits> {
    let limits: Limits = toml::from_str(content)?;
    limits.validate()?;
    Ok(limits)
}

/// Loads and validates a limits file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use depthwise::config::load_limits;
///
/// let limits = load_limits(Path::new("limits.toml")).unwrap();
/// println!("per-host cap: {}", limits.per_host);
/// ```
pub fn load_limits(path: &Path) -> ConfigResult<Limits> {
    let content = std::fs::read_to_string(path)?;
    parse_limits(&content)
}
