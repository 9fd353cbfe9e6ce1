//! Fixed-capacity worker pools
//!
//! A dispatcher runs one category of work (downloads or extractions) on a
//! fixed number of worker tasks draining a shared job channel. The pool
//! size is the hard cap on how many jobs of that category run at once.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A unit of work accepted by a dispatcher.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// How long `close` waits for workers before giving up on them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Fixed-capacity worker pool over an mpsc job channel.
///
/// Workers keep draining the channel after `close` drops the sender, so
/// already-submitted jobs still run during shutdown; `close` only stops new
/// submissions and bounds how long it waits for the drain.
pub struct Dispatcher {
    name: &'static str,
    tx: std::sync::Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawns `capacity` workers. Must be called within a Tokio runtime.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let workers = (0..capacity)
            .map(|_| {
                let rx = Arc::clone(&rx);
                tokio::spawn(async move {
                    loop {
                        // Only the receive is serialized; the job itself runs
                        // with the channel lock released.
                        let job = { rx.lock().await.recv().await };
                        match job {
                            Some(job) => job.await,
                            None => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            name,
            tx: std::sync::Mutex::new(Some(tx)),
            workers: std::sync::Mutex::new(workers),
        }
    }

    /// Hands a job to the pool. After `close` the job is dropped.
    pub fn submit(&self, job: Job) {
        let accepted = match self.tx.lock().unwrap().as_ref() {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        };
        if !accepted {
            tracing::warn!("{} pool is closed, dropping task", self.name);
        }
    }

    /// Stops accepting jobs and waits up to the grace period for workers.
    ///
    /// A worker that overruns the grace period or panicked is reported and
    /// left behind; nothing is re-raised. Calling `close` again is a no-op.
    pub async fn close(&self) {
        drop(self.tx.lock().unwrap().take());

        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        if workers.is_empty() {
            return;
        }

        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        for handle in workers {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("{} worker ended abnormally: {}", self.name, e);
                }
                Err(_) => {
                    tracing::warn!(
                        "{} worker still busy after {:?}, abandoning it",
                        self.name,
                        SHUTDOWN_GRACE
                    );
                }
            }
        }
        tracing::debug!("{} pool shut down", self.name);
    }
}
