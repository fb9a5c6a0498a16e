// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap (bad arguments exit with code 2)
// 2. Turn them into a validated CrawlConfig
// 3. Crawl the site and wait until every page task is done
// 4. Write the CSV report (and optionally print JSON)
// 5. Exit with proper code (0 = success, 1 = error)
//
// Failures on individual pages never reach this file: they are logged and the
// crawl keeps going. Only a bad start URL or an unwritable report is fatal.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod logging;
mod page;
mod report;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use cli::Cli;
use config::CrawlConfig;
use crawl::{CanonicalKey, Crawler};
use page::{HtmlExtractor, HttpFetcher, PageRecord};

#[tokio::main]
async fn main() {
    // clap prints its own message and exits with code 2 on bad arguments
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    logging::init_logging()?;

    let config = CrawlConfig::try_from(cli)?;

    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)
        .context("failed to build HTTP client")?;
    let crawler = Crawler::new(&config, Arc::new(fetcher), Arc::new(HtmlExtractor))?;

    let started = Instant::now();
    let pages = crawler.run().await;
    info!(pages = pages.len(), elapsed = ?started.elapsed(), "crawl finished");

    if config.json {
        print_json(&pages)?;
    }

    report::write_report(&pages, &config.output)?;

    eprintln!("📄 Crawled {} page(s)", pages.len());
    eprintln!("📊 Report written to: {}", config.output.display());
    Ok(())
}

// One entry of the `--json` output: the key next to the record's fields
#[derive(Serialize)]
struct JsonPage<'a> {
    key: &'a CanonicalKey,
    #[serde(flatten)]
    record: &'a PageRecord,
}

fn print_json(pages: &[(CanonicalKey, PageRecord)]) -> Result<()> {
    let entries: Vec<JsonPage> = pages
        .iter()
        .map(|(key, record)| JsonPage { key, record })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
