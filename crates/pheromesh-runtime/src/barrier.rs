//! Countdown barrier for round completion.
//!
//! Each round gets a fresh barrier preset to the number of ants released.
//! Every ant leaving the round (reaching the goal or being withdrawn)
//! counts it down exactly once; the colony waits for zero before touching
//! pheromone again.

use crate::error::{RuntimeError, RuntimeResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};

/// Barrier that releases waiters once `count` arrivals have been reported.
#[derive(Debug)]
pub struct CountdownBarrier {
    /// Arrivals still outstanding.
    remaining: AtomicUsize,
    /// Number the barrier was created with.
    initial: usize,
    /// Wakes waiters when the count reaches zero.
    notify: Notify,
}

impl CountdownBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            initial: count,
            notify: Notify::new(),
        }
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.remaining() == 0
    }

    /// Report one arrival. Returns the count still outstanding.
    ///
    /// Arrivals past zero are ignored.
    pub fn arrive(&self) -> usize {
        let prev = match self.remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            n.checked_sub(1)
        }) {
            Ok(prev) => prev,
            Err(_) => {
                tracing::warn!("arrival reported on a barrier that is already open");
                return 0;
            }
        };
        let now = prev - 1;
        if now == 0 {
            self.notify.notify_waiters();
        }
        now
    }

    /// Wait until every arrival has been reported.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a wake between the check and the
            // await is not lost.
            notified.as_mut().enable();
            if self.is_open() {
                return;
            }
            notified.await;
        }
    }

    /// Wait with a timeout.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::BarrierTimeout` carrying the outstanding count
    /// if the deadline passes first.
    pub async fn wait_timeout(&self, timeout: Duration) -> RuntimeResult<()> {
        self.wait_until(Instant::now() + timeout).await
    }

    /// Wait until an absolute deadline.
    pub async fn wait_until(&self, deadline: Instant) -> RuntimeResult<()> {
        tokio::select! {
            _ = self.wait() => Ok(()),
            _ = tokio::time::sleep_until(deadline) => {
                // The count may have closed on the same poll.
                if self.is_open() {
                    Ok(())
                } else {
                    Err(RuntimeError::BarrierTimeout {
                        remaining: self.remaining(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_barrier_creation() {
        let barrier = CountdownBarrier::new(3);
        assert_eq!(barrier.initial(), 3);
        assert_eq!(barrier.remaining(), 3);
        assert!(!barrier.is_open());
    }

    #[tokio::test]
    async fn test_arrivals_count_down() {
        let barrier = CountdownBarrier::new(2);
        assert_eq!(barrier.arrive(), 1);
        assert_eq!(barrier.arrive(), 0);
        assert!(barrier.is_open());
        // Extra arrivals do not wrap around.
        assert_eq!(barrier.arrive(), 0);
        assert_eq!(barrier.remaining(), 0);
    }

    #[tokio::test]
    async fn test_zero_barrier_is_open() {
        let barrier = CountdownBarrier::new(0);
        barrier.wait().await;
        barrier.wait_timeout(Duration::from_millis(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_completes() {
        let barrier = Arc::new(CountdownBarrier::new(20));

        for _ in 0..20 {
            let b = Arc::clone(&barrier);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                b.arrive();
            });
        }

        barrier.wait_timeout(Duration::from_secs(5)).await.unwrap();
        assert!(barrier.is_open());
    }

    #[tokio::test]
    async fn test_timeout_reports_remaining() {
        let barrier = CountdownBarrier::new(3);
        barrier.arrive();

        let err = barrier
            .wait_timeout(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, RuntimeError::BarrierTimeout { remaining: 2 });
    }
}
