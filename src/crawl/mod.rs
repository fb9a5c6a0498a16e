// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Pieces:
// - normalize:    turns a URL into the key we deduplicate pages by
// - registry:     the shared "have we seen this page?" map + collected records
// - limiter:      caps how many pages are fetched at the same time
// - scope:        keeps the crawl on the start URL's host
// - tracker:      counts outstanding page tasks, wakes the driver at zero
// - orchestrator: ties them together, one task per discovered link
//
// Only the Crawler and the key type are needed outside this module.
// =============================================================================

mod limiter;
mod normalize;
mod orchestrator;
mod registry;
mod scope;
mod tracker;

pub use normalize::CanonicalKey;
pub use orchestrator::Crawler;

#[cfg(test)]
pub(crate) use normalize::normalize;
