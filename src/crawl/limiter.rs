// src/crawl/limiter.rs
// =============================================================================
// Caps how many pages are being fetched and parsed at the same time.
//
// This is a thin wrapper over tokio's Semaphore. acquire() hands back an
// owned permit; the permit goes back to the pool when it is dropped, so a
// task releases it on every exit path (early return, error, even a panic).
//
// Note the limiter bounds *work*, not *tasks*: any number of crawl tasks may
// exist and wait here.
// =============================================================================

use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of concurrency budget, returned to the pool on drop.
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity.get())),
            capacity: capacity.get(),
        }
    }

    // Waits until a permit is free
    //
    // Only fails if the semaphore was closed, which this crate never does.
    pub async fn acquire(&self) -> Result<Permit, AcquireError> {
        let permit = self.permits.clone().acquire_owned().await?;
        Ok(Permit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(n: usize) -> ConcurrencyLimiter {
        ConcurrencyLimiter::new(NonZeroUsize::new(n).unwrap())
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = limiter(2);
        assert_eq!(limiter.capacity(), 2);

        let first = limiter.acquire().await.unwrap();
        let second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available(), 0);

        drop(first);
        assert_eq!(limiter.available(), 1);
        drop(second);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let limiter = limiter(1);
        let held = limiter.acquire().await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should get the permit")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_permit_released_on_early_return() {
        async fn bail_out(limiter: &ConcurrencyLimiter) -> Result<(), &'static str> {
            let _permit = limiter.acquire().await.map_err(|_| "closed")?;
            Err("gave up")
        }

        let limiter = limiter(1);
        assert!(bail_out(&limiter).await.is_err());
        assert_eq!(limiter.available(), 1);
    }
}
