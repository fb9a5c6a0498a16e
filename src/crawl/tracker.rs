// src/crawl/tracker.rs
// =============================================================================
// Knows when the whole crawl is finished.
//
// The number of pages isn't known up front (every page can discover more),
// so we can't wait on a fixed set of handles. Instead we count outstanding
// tasks:
// - register() adds one and returns a TaskGuard; call it BEFORE spawning
// - dropping (or completing) the guard removes one
// - wait() returns once the count is back to zero
//
// A parent registers its children before its own guard is dropped, so the
// count can only reach zero when no task is running and none is about to be
// spawned.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Counter {
    outstanding: AtomicUsize,
    idle: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    counter: Arc<Counter>,
}

/// Proof that one task is outstanding. Completes on drop.
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the task as complete"]
pub struct TaskGuard {
    counter: Arc<Counter>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> TaskGuard {
        self.counter.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            counter: self.counter.clone(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.counter.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once every registered task has completed.
    pub async fn wait(&self) {
        loop {
            // Register interest before reading the counter so a completion
            // between the read and the await can't be missed.
            let notified = self.counter.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl TaskGuard {
    pub fn complete(self) {
        // the work happens in Drop
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.counter.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.counter.idle.notify_waiters();
        }
    }
}
