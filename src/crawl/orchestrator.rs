// src/crawl/orchestrator.rs
// =============================================================================
// The crawl engine: one tokio task per discovered link.
//
// How a single page task works:
// 1. Wait for a concurrency permit
// 2. Stop if the (soft) page limit is already reached
// 3. Parse the URL and stop if it's on another host
// 4. Normalize it and claim the key; stop if someone else already has it
// 5. Fetch and extract the page, store the record
// 6. Spawn a new task for every outgoing link
//
// Nothing that goes wrong on one page stops the crawl. Bad URLs, other hosts,
// failed fetches and unparseable pages are logged at debug level and the task
// simply ends.
//
// The permit only covers the task's own fetch/extract work. Children are
// spawned and left to queue for their own permit, so a parent never waits on
// its children while holding one (a crawl with a single permit still works).
// The CompletionTracker tells the driver when the last task is done.
// =============================================================================

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};
use url::Url;

use super::limiter::ConcurrencyLimiter;
use super::normalize::{normalize, CanonicalKey, NormalizeError};
use super::registry::VisitedRegistry;
use super::scope::HostScope;
use super::tracker::CompletionTracker;
use crate::config::{ConfigError, CrawlConfig};
use crate::page::{ExtractError, Extractor, FetchError, Fetcher, PageRecord};

/// Why a page task gave up. None of these ever leave the task.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("malformed URL: {0}")]
    MalformedUrl(#[from] NormalizeError),
    #[error("{url} is outside {origin}")]
    OutOfScope { url: String, origin: String },
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

// How a page task ended when nothing went wrong
//
// Skips are normal: most links on a site point at pages that another task
// has already claimed.
#[derive(Debug)]
enum Visit {
    Crawled { key: CanonicalKey, links: usize },
    AlreadyClaimed,
    LimitReached,
    LimiterClosed,
}

// Everything the page tasks share. Each task holds an Arc to it.
struct Shared {
    // key -> record, the only mutable shared state
    registry: VisitedRegistry,
    limiter: ConcurrencyLimiter,
    tracker: CompletionTracker,
    scope: HostScope,
    // 0 = no limit
    max_pages: usize,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
}

/// Crawls one site from a start URL.
///
/// Build it with [`Crawler::new`], then call [`Crawler::run`] once.
pub struct Crawler {
    start_url: Url,
    shared: Arc<Shared>,
}

impl Crawler {
    // Sets up an empty registry, the limiter and the host scope
    //
    // Parameters:
    //   config:    start URL, concurrency cap and page limit
    //   fetcher:   downloads pages (HttpFetcher in production)
    //   extractor: turns page content into a PageRecord
    //
    // Fails when the start URL has no host to restrict the crawl to.
    pub fn new(
        config: &CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, ConfigError> {
        let scope = HostScope::from_start_url(config.start_url.as_str())
            .ok_or_else(|| ConfigError::MissingHost(config.start_url.to_string()))?;

        Ok(Self {
            start_url: config.start_url.clone(),
            shared: Arc::new(Shared {
                registry: VisitedRegistry::new(),
                limiter: ConcurrencyLimiter::new(config.max_concurrency),
                tracker: CompletionTracker::new(),
                scope,
                max_pages: config.max_pages,
                fetcher,
                extractor,
            }),
        })
    }

    /// Crawls from the start URL until the task tree is empty.
    ///
    /// Returns every claimed page sorted by key, including the empty
    /// placeholders of pages whose fetch failed.
    pub async fn run(self) -> Vec<(CanonicalKey, PageRecord)> {
        info!(
            origin = self.shared.scope.origin_host(),
            max_concurrency = self.shared.limiter.capacity(),
            max_pages = self.shared.max_pages,
            "starting crawl of {}",
            self.start_url
        );

        // The seed is the root of the task tree; every other task is spawned
        // by a page task
        self.shared.spawn_page(self.start_url.to_string());

        // Returns once the last task in the tree has finished
        self.shared.tracker.wait().await;

        // No task is left, so nothing can claim or finalize any more
        self.shared.registry.drain()
    }
}

impl Shared {
    // Registers the task BEFORE spawning it, so the tracker can never see
    // zero while a child is about to start
    fn spawn_page(self: &Arc<Self>, raw_url: String) {
        let guard = self.tracker.register();
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            shared.crawl_page(raw_url).await;
            guard.complete();
        });
    }

    // Runs one page task and logs how it ended
    //
    // Errors stop here: nothing is propagated to the parent or retried.
    async fn crawl_page(self: &Arc<Self>, raw_url: String) {
        match self.visit(&raw_url).await {
            Ok(Visit::Crawled { key, links }) => info!(page = %key, links, "crawled"),
            Ok(Visit::AlreadyClaimed) => trace!(url = %raw_url, "already visited"),
            Ok(Visit::LimitReached) => debug!(url = %raw_url, "page limit reached, skipping"),
            Ok(Visit::LimiterClosed) => debug!(url = %raw_url, "limiter closed, skipping"),
            Err(PageError::Fetch(e)) => {
                debug!(url = %raw_url, kind = e.kind(), error = %e, "fetch failed")
            }
            Err(e) => debug!(url = %raw_url, error = %e, "skipping"),
        }
    }

    // The page task itself, in the order described at the top of this file
    //
    // Parameters:
    //   raw_url: the link as the extractor returned it (or the start URL)
    //
    // Returns how the task ended; Err for pages that couldn't be crawled.
    async fn visit(self: &Arc<Self>, raw_url: &str) -> Result<Visit, PageError> {
        // Held until the function returns, on every path
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => return Ok(Visit::LimiterClosed),
        };
        trace!(
            url = raw_url,
            free_permits = self.limiter.available(),
            outstanding = self.tracker.outstanding(),
            "permit acquired"
        );

        // Soft limit: other tasks may claim between this check and ours
        if self.max_pages > 0 && self.registry.size() >= self.max_pages {
            return Ok(Visit::LimitReached);
        }

        // Unparseable links are dropped here
        let url = Url::parse(raw_url).map_err(|source| NormalizeError::Invalid {
            url: raw_url.to_string(),
            source,
        })?;

        // Host as written, compared with the start URL's host
        if !self.scope.contains(raw_url) {
            return Err(PageError::OutOfScope {
                url: raw_url.to_string(),
                origin: self.scope.origin_host().to_string(),
            });
        }

        // Claim is the only dedup step: exactly one task wins each key
        let key = normalize(raw_url)?;
        if !self.registry.claim(&key) {
            return Ok(Visit::AlreadyClaimed);
        }

        // From here on a failure leaves the empty placeholder as the record
        let body = self.fetcher.fetch(&url).await?;
        let record = self.extractor.extract(&body, &url)?;
        // Keep the URL in the form that won the claim
        let record = PageRecord {
            url: raw_url.to_string(),
            ..record
        };

        let links = record.outgoing_links.clone();
        self.registry.finalize(&key, record);

        // Spawn one task per link and don't wait for them; the permit is
        // released as soon as we return
        for link in &links {
            self.spawn_page(link.clone());
        }

        Ok(Visit::Crawled {
            key,
            links: links.len(),
        })
    }
}
