// src/page/mod.rs
// =============================================================================
// Everything that happens to a single page: fetching it and pulling
// structured fields out of it.
//
// Submodules:
// - fetch: downloads a page over HTTP (the Fetcher trait + HttpFetcher)
// - extract: parses HTML into a PageRecord (the Extractor trait + HtmlExtractor)
//
// The crawl engine only talks to the two traits, so tests can swap in an
// in-memory site instead of a real web server.
// =============================================================================

mod extract;
mod fetch;

pub use extract::{ExtractError, Extractor, HtmlExtractor};
pub use fetch::{FetchError, Fetcher, HttpFetcher};

use serde::Serialize;

/// What we keep for every distinct page.
///
/// A default (empty) record is the placeholder stored while the page is
/// being fetched, and stays as the final record if the fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// The URL the page was fetched from (first form we saw)
    pub url: String,
    /// Text of the first <h1>, empty if there is none
    pub heading: String,
    /// First non-empty paragraph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Every link target in document order, duplicates included
    pub outgoing_links: Vec<String>,
    /// Every image source in document order
    pub media: Vec<String>,
}
