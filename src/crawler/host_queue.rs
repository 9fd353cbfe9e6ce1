//! Per-host admission control
//!
//! Each host gets an independent running count and FIFO of deferred jobs.
//! A job is dispatched to the download pool immediately while the host is
//! under its cap, otherwise it waits in that host's queue until a running
//! download for the host completes. Hosts never contend with each other:
//! the map lock is held only to look up a host's slot, and all admission
//! decisions happen under that slot's own lock.

use super::dispatcher::{Dispatcher, Job};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Per-host FIFO limiters, keyed by host name.
///
/// Slots are created lazily on first reference to a host and live for the
/// lifetime of the engine, so a host's cap also holds across consecutive
/// `download` calls.
pub struct HostQueues {
    per_host: usize,
    slots: Mutex<HashMap<String, Arc<HostSlot>>>,
}

struct HostSlot {
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    running: usize,
    waiting: VecDeque<Job>,
}

impl HostQueues {
    pub fn new(per_host: usize) -> Self {
        Self {
            per_host,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, host: &str) -> Arc<HostSlot> {
        let mut slots = self.slots.lock().unwrap();
        Arc::clone(slots.entry(host.to_string()).or_insert_with(|| {
            Arc::new(HostSlot {
                state: Mutex::new(SlotState::default()),
            })
        }))
    }

    /// Admits `job` for `host`: dispatches it to `pool` if the host is
    /// under its cap, otherwise parks it in the host's FIFO.
    pub fn enqueue(&self, host: &str, job: Job, pool: &Dispatcher) {
        let slot = self.slot(host);
        let mut state = slot.state.lock().unwrap();
        if state.running < self.per_host {
            state.running += 1;
            pool.submit(job);
        } else {
            state.waiting.push_back(job);
        }
    }

    /// Called by a download job for `host` when it finishes, whatever the
    /// outcome. Dispatches the next parked job for the host if there is
    /// one (the running count is unchanged, the slot passes straight to
    /// the successor), otherwise frees the slot.
    pub fn complete(&self, host: &str, pool: &Dispatcher) {
        let slot = self.slot(host);
        let mut state = slot.state.lock().unwrap();
        match state.waiting.pop_front() {
            Some(job) => pool.submit(job),
            None => state.running = state.running.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Harness {
        hosts: Arc<HostQueues>,
        pool: Arc<Dispatcher>,
    }

    impl Harness {
        fn new(per_host: usize, capacity: usize) -> Self {
            Self {
                hosts: Arc::new(HostQueues::new(per_host)),
                pool: Arc::new(Dispatcher::new("test", capacity)),
            }
        }

        /// Enqueues a job that sleeps, runs `work`, then releases its slot
        /// the way a download task does.
        fn run(&self, host: &str, work: impl FnOnce() + Send + 'static) {
            let hosts = Arc::clone(&self.hosts);
            let pool = Arc::clone(&self.pool);
            let host_owned = host.to_string();
            let job: Job = Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                work();
                hosts.complete(&host_owned, &pool);
            });
            self.hosts.enqueue(host, job, &self.pool);
        }
    }

    #[tokio::test]
    async fn test_cap_enforced_per_host() {
        let harness = Harness::new(2, 8);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let finished = Arc::clone(&finished);
            let hosts = Arc::clone(&harness.hosts);
            let pool = Arc::clone(&harness.pool);
            let job: Job = Box::pin(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
                hosts.complete("example.com", &pool);
            });
            harness.hosts.enqueue("example.com", job, &harness.pool);
        }

        harness.pool.close().await;
        assert_eq!(finished.load(Ordering::SeqCst), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_fifo_order_within_host() {
        let harness = Harness::new(1, 4);
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = Arc::clone(&order);
            harness.run("example.com", move || {
                order.lock().unwrap().push(i);
            });
        }

        harness.pool.close().await;
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_hosts_are_independent() {
        let harness = Harness::new(1, 4);
        let b_done = Arc::new(AtomicUsize::new(0));

        // Saturate host A with a slow job plus a parked one.
        let hosts = Arc::clone(&harness.hosts);
        let pool = Arc::clone(&harness.pool);
        let slow: Job = Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            hosts.complete("a.example", &pool);
        });
        harness.hosts.enqueue("a.example", slow, &harness.pool);
        harness.run("a.example", || {});

        let done = Arc::clone(&b_done);
        harness.run("b.example", move || {
            done.fetch_add(1, Ordering::SeqCst);
        });

        // Host B's job finishes while host A is still saturated.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(b_done.load(Ordering::SeqCst), 1);

        harness.pool.close().await;
    }
}
