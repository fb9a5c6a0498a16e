// src/crawl/registry.rs
// =============================================================================
// The visited registry: canonical key -> page record, shared by every task.
//
// It is the only mutable state the crawl tasks share, so every operation
// goes through one mutex. Claiming a key is a single check-and-insert under
// that lock; a separate "contains" followed by an "insert" would let two
// tasks fetch the same page.
//
// Lifecycle:
// 1. created empty when the crawl starts
// 2. claim() inserts an empty placeholder the first time a key is seen
// 3. finalize() overwrites the placeholder once the page is extracted
// 4. drain() reads everything once, after the last task has finished
// =============================================================================

use parking_lot::Mutex;
use std::collections::HashMap;

use super::normalize::CanonicalKey;
use crate::page::PageRecord;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    // parking_lot's Mutex never poisons, so a panicking task can't lock the
    // other tasks out of the registry
    pages: Mutex<HashMap<CanonicalKey, PageRecord>>,
}

impl VisitedRegistry {
    // Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for the calling task.
    ///
    /// Returns `true` for exactly one caller per key; that caller owns the
    /// fetch. Everyone else gets `false` and must not touch the page.
    pub fn claim(&self, key: &CanonicalKey) -> bool {
        // The lock is held for both the lookup and the insert
        let mut pages = self.pages.lock();
        if pages.contains_key(key) {
            return false;
        }

        // The placeholder stays as the final record if the fetch fails
        pages.insert(key.clone(), PageRecord::default());
        true
    }

    /// Replaces the placeholder stored for a claimed key.
    pub fn finalize(&self, key: &CanonicalKey, record: PageRecord) {
        let previous = self.pages.lock().insert(key.clone(), record);

        // Not fatal, but it means a page skipped the claim step
        if previous.is_none() {
            tracing::warn!(key = %key, "finalized a page that was never claimed");
        }
    }

    /// Number of distinct claimed keys.
    ///
    /// Other tasks may claim right after this returns, so a page limit built
    /// on it is a soft bound.
    pub fn size(&self) -> usize {
        self.pages.lock().len()
    }

    /// Takes every record out of the registry, sorted by key.
    pub fn drain(&self) -> Vec<(CanonicalKey, PageRecord)> {
        // Swap the map out so the lock is released before sorting
        let pages = std::mem::take(&mut *self.pages.lock());
        let mut pages: Vec<_> = pages.into_iter().collect();

        // HashMap order is random; sort so reports are reproducible
        pages.sort_by(|a, b| a.0.cmp(&b.0));
        pages
    }
}
