//! Per-collection FIFO job queue.
//!
//! Every collection owns one [`Queue`]. All store operations against that
//! collection are wrapped into a [`Job`] and pushed here; a single worker
//! task receives jobs in submission order and awaits each job's future to
//! completion before taking the next one. Submission order therefore equals
//! both dispatch order and completion order for any one collection, which
//! is what makes read-modify-write sequences inside a single job safe
//! against interleaving from other queued operations.
//!
//! The queue is unbounded and has no cancellation: once pushed, a job runs
//! (process lifetime permitting). Operations against different collections
//! run on different queues and have no ordering relationship.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Result, StoreError};

type BoxedWork = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A single unit of deferred work.
///
/// The job carries its own completion signalling (callers embed a oneshot
/// sender inside the future); the queue observes nothing beyond "the future
/// finished".
pub(crate) struct Job {
    work: BoxedWork,
}

impl Job {
    pub(crate) fn new<F>(work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { work: Box::pin(work) }
    }

    async fn run(self) {
        self.work.await;
    }
}

/// FIFO execution queue with a dedicated worker task.
#[derive(Clone)]
pub(crate) struct Queue {
    tx: mpsc::UnboundedSender<Job>,
}

impl Queue {
    /// Spawn the worker task and return a handle for pushing jobs.
    ///
    /// The worker lives until every clone of the handle is dropped and the
    /// channel closes. `label` only feeds trace logging.
    pub(crate) fn new(label: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                trace!(queue = label, "dispatching job");
                job.run().await;
            }
            trace!(queue = label, "queue closed");
        });
        Self { tx }
    }

    /// Enqueue a job. Fails only when the worker is gone.
    pub(crate) fn push(&self, job: Job) -> Result<()> {
        self.tx.send(job).map_err(|_| StoreError::QueueClosed)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{oneshot, Mutex};

    #[tokio::test]
    async fn jobs_dispatch_in_submission_order() {
        let queue = Queue::new("test");
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut receivers = Vec::new();

        for i in 0..32u32 {
            let order = Arc::clone(&order);
            let (tx, rx) = oneshot::channel();
            receivers.push(rx);
            queue
                .push(Job::new(async move {
                    order.lock().await.push(i);
                    let _ = tx.send(());
                }))
                .unwrap();
        }

        for rx in receivers {
            rx.await.unwrap();
        }
        let seen = order.lock().await.clone();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn completion_order_matches_even_when_early_jobs_are_slow() {
        let queue = Queue::new("test");
        let order = Arc::new(Mutex::new(Vec::new()));

        // First job sleeps; were the queue dispatch-only, the second job
        // would finish first.
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let order1 = Arc::clone(&order);
        let order2 = Arc::clone(&order);

        queue
            .push(Job::new(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                order1.lock().await.push("slow");
                let _ = tx1.send(());
            }))
            .unwrap();
        queue
            .push(Job::new(async move {
                order2.lock().await.push("fast");
                let _ = tx2.send(());
            }))
            .unwrap();

        rx1.await.unwrap();
        rx2.await.unwrap();
        assert_eq!(*order.lock().await, vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn push_after_worker_gone_reports_closed() {
        let queue = Queue::new("test");
        // Dropping every handle closes the channel and ends the worker.
        let stale = queue.clone();
        drop(queue);
        // The clone still holds the channel open, so this push succeeds...
        assert!(stale.push(Job::new(async {})).is_ok());
        // ...but a sender whose receiver task ended reports QueueClosed.
        let (tx, _rx) = mpsc::unbounded_channel::<Job>();
        let dead = Queue { tx };
        drop(_rx);
        assert!(matches!(
            dead.push(Job::new(async {})),
            Err(StoreError::QueueClosed)
        ));
    }
}
