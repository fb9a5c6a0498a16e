// src/page/extract.rs
// =============================================================================
// This module turns a page's HTML into a PageRecord.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Returns matches in document order (depth-first), which is exactly the
//   "first match wins" order we want
//
// Fields we extract:
// - heading:  text of the first <h1>, as-is (nested text concatenated)
// - excerpt:  first non-empty <p> inside <main>, else first non-empty <p>
// - links:    every <a href>, resolved against the page URL
// - media:    every <img src>, resolved the same way
//
// Links are kept raw: same order as the document, duplicates included, no
// filtering by scheme or host. Deciding what to follow is the crawler's job.
// =============================================================================

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use super::PageRecord;

// Selector::parse only fails on invalid CSS, and these are constants
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static MAIN_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("main p").expect("valid selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("valid selector"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot resolve links against {0}")]
    NotABase(String),
}

/// Parses raw page content into structured fields.
///
/// `page_url` is where the content came from; relative references are
/// resolved against it.
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &str, page_url: &Url) -> Result<PageRecord, ExtractError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn extract(&self, body: &str, page_url: &Url) -> Result<PageRecord, ExtractError> {
        if page_url.cannot_be_a_base() {
            return Err(ExtractError::NotABase(page_url.to_string()));
        }

        let document = Html::parse_document(body);

        Ok(PageRecord {
            url: page_url.to_string(),
            heading: heading(&document),
            excerpt: excerpt(&document),
            outgoing_links: resolved_attrs(&document, &LINK, "href", page_url),
            media: resolved_attrs(&document, &IMAGE, "src", page_url),
        })
    }
}

fn heading(document: &Html) -> String {
    document
        .select(&HEADING)
        .next()
        .map(|h1| h1.text().collect::<String>())
        .unwrap_or_default()
}

// Paragraphs inside <main> win; otherwise the first paragraph anywhere.
// Whitespace-only paragraphs don't count, we keep looking.
fn excerpt(document: &Html) -> Option<String> {
    first_non_empty(document.select(&MAIN_PARAGRAPH))
        .or_else(|| first_non_empty(document.select(&PARAGRAPH)))
}

fn first_non_empty<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    paragraphs
        .map(|p| p.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

// Collects `attr` from every element matching `selector`, resolved against
// the page URL. Empty or unresolvable values are skipped.
fn resolved_attrs(document: &Html, selector: &Selector, attr: &str, base: &Url) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|value| resolve_url(base, value))
        .collect()
}

// Resolves a possibly-relative URL to an absolute URL
//
// Absolute references are returned as written, so the crawler's host check
// sees the host exactly as the page spelled it (case, explicit ports).
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"              -> Some("https://example.com/docs")
//   href = "../other"           -> Some("https://example.com/other")
//   href = "https://Other.com"  -> Some("https://Other.com")
//   href = ""                   -> None
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }
    base.join(href).ok().map(|url| url.to_string())
}
