// src/config.rs
// =============================================================================
// Runtime configuration for a crawl.
//
// The CLI is the only source of settings; CrawlConfig is the validated form
// the rest of the program works with. Defaults:
// - max_concurrency: 10
// - max_pages:       0 (unlimited)
// - request_timeout: 10 seconds
// - output:          report.csv
// =============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;

pub const DEFAULT_USER_AGENT: &str = concat!("site-crawler/", env!("CARGO_PKG_VERSION"));

const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("only http and https URLs can be crawled, got {0}")]
    UnsupportedScheme(String),
    #[error("start URL has no host: {0}")]
    MissingHost(String),
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    pub max_concurrency: NonZeroUsize,
    /// 0 means no limit
    pub max_pages: usize,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub output: PathBuf,
    pub json: bool,
}

impl CrawlConfig {
    // Config with every default, for the given start URL
    pub fn new(start_url: Url) -> Self {
        Self {
            start_url,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_pages: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            output: PathBuf::from("report.csv"),
            json: false,
        }
    }
}

impl TryFrom<Cli> for CrawlConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if !matches!(cli.url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(cli.url.to_string()));
        }
        if !cli.url.has_host() {
            return Err(ConfigError::MissingHost(cli.url.to_string()));
        }

        let mut config = Self::new(cli.url);
        config.max_concurrency = cli.max_concurrency;
        config.max_pages = cli.max_pages;
        config.user_agent = cli.user_agent;
        config.request_timeout = Duration::from_secs(cli.timeout);
        config.output = cli.output;
        config.json = cli.json;
        Ok(config)
    }
}
