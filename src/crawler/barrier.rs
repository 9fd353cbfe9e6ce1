//! Completion barrier for one traversal layer
//!
//! The set of tasks belonging to a layer is not known when the layer
//! starts: a download that succeeds mid-layer spawns an extraction task
//! that also belongs to the layer. A fixed-arity join cannot express that,
//! so the barrier is a plain pending-count that tasks register with and
//! arrive at, and the engine waits for zero.

use tokio::sync::watch;

/// Dynamic-arity completion counter for one layer.
///
/// The engine holds a sentinel registration for the whole submission phase,
/// so the count cannot cross zero while URLs are still being enumerated.
pub struct LayerBarrier {
    pending: watch::Sender<usize>,
}

impl LayerBarrier {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self { pending }
    }

    /// Adds one participant. Safe to call while `wait` is already blocked.
    pub fn register(&self) {
        self.pending.send_modify(|n| *n += 1);
    }

    /// Marks one registered participant as finished.
    pub fn arrive(&self) {
        self.pending.send_modify(|n| {
            debug_assert!(*n > 0, "arrive without a matching register");
            *n -= 1;
        });
    }

    /// Blocks until every registered participant has arrived.
    ///
    /// The count is read under the same synchronized cell that `register`
    /// and `arrive` mutate, so registrations and the wait may interleave
    /// arbitrarily without lost wakeups.
    pub async fn wait(&self) {
        let mut rx = self.pending.subscribe();
        while *rx.borrow_and_update() != 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for LayerBarrier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_with_no_participants_returns_immediately() {
        let barrier = LayerBarrier::new();
        barrier.wait().await;
    }

    #[tokio::test]
    async fn test_wait_blocks_until_all_arrive() {
        let barrier = Arc::new(LayerBarrier::new());
        let done = Arc::new(AtomicBool::new(false));

        for _ in 0..3 {
            barrier.register();
        }

        for i in 0..3 {
            let barrier = Arc::clone(&barrier);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10 * (i + 1))).await;
                if i == 2 {
                    done.store(true, Ordering::SeqCst);
                }
                barrier.arrive();
            });
        }

        barrier.wait().await;
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_registration_after_wait_started() {
        let barrier = Arc::new(LayerBarrier::new());
        let late_done = Arc::new(AtomicBool::new(false));

        // One participant already registered; it spawns a second one after
        // the waiter is likely already blocked, then arrives.
        barrier.register();
        {
            let barrier = Arc::clone(&barrier);
            let late_done = Arc::clone(&late_done);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                barrier.register();
                let inner = Arc::clone(&barrier);
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    late_done.store(true, Ordering::SeqCst);
                    inner.arrive();
                });
                barrier.arrive();
            });
        }

        barrier.wait().await;
        assert!(late_done.load(Ordering::SeqCst));
    }
}
