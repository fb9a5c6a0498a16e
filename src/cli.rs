// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   site-crawler <URL> [MAX_CONCURRENCY] [MAX_PAGES] [--output report.csv]
//
// clap validates everything before we start crawling: a bad URL, a zero or
// negative concurrency, or a negative page limit prints an error and exits
// with a non-zero code.
// =============================================================================

use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use url::Url;

use crate::config::DEFAULT_USER_AGENT;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl a single website concurrently and write a CSV report of its pages",
    long_about = "site-crawler follows every link on a website without leaving its host, \
                  fetching up to MAX_CONCURRENCY pages at a time, and writes one CSV row \
                  per distinct page: its heading, first paragraph, links and images."
)]
pub struct Cli {
    /// Website URL to start from (e.g., https://example.com)
    pub url: Url,

    /// How many pages may be fetched at the same time (must be at least 1)
    #[arg(default_value = "10")]
    pub max_concurrency: NonZeroUsize,

    /// Stop claiming new pages once this many are known (0 = unlimited)
    ///
    /// This is a soft limit: pages already in flight when it is reached still
    /// finish, so the report can hold a few more.
    #[arg(default_value_t = 0)]
    pub max_pages: usize,

    /// Where to write the CSV report
    #[arg(short, long, default_value = "report.csv")]
    pub output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Also print the crawled pages as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["site-crawler", "https://example.com"]).unwrap();
        assert_eq!(cli.url.as_str(), "https://example.com/");
        assert_eq!(cli.max_concurrency.get(), 10);
        assert_eq!(cli.max_pages, 0);
        assert_eq!(cli.output, PathBuf::from("report.csv"));
        assert_eq!(cli.timeout, 10);
        assert_eq!(cli.user_agent, DEFAULT_USER_AGENT);
        assert!(!cli.json);
    }

    #[test]
    fn test_positional_limits() {
        let cli = Cli::try_parse_from(["site-crawler", "https://example.com", "3", "25"]).unwrap();
        assert_eq!(cli.max_concurrency.get(), 3);
        assert_eq!(cli.max_pages, 25);
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let bad = [
            vec!["site-crawler"],
            vec!["site-crawler", "not a url"],
            vec!["site-crawler", "https://example.com", "0"],
            vec!["site-crawler", "https://example.com", "abc"],
            vec!["site-crawler", "https://example.com", "5", "-1"],
            vec!["site-crawler", "https://example.com", "5", "10", "extra"],
            vec!["site-crawler", "https://example.com", "--timeout", "0"],
        ];
        for args in bad {
            assert!(
                Cli::try_parse_from(args.iter().copied()).is_err(),
                "should reject {:?}",
                args
            );
        }
    }
}
