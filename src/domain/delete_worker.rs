//! Background worker that batches soft-delete requests.
//!
//! Producers push [`PendingDelete`] values through a [`DeleteQueue`]; a single
//! task buffers them and hands the whole buffer to the backend on every tick.
//! The buffer is cleared after each flush attempt whether or not it succeeded,
//! so delivery is at most once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::delete_request::PendingDelete;
use crate::domain::repositories::BatchDeletable;

/// Default pause between two flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Cloneable intake handle of the delete worker.
///
/// Enqueueing never blocks: the channel is unbounded and only the worker
/// touches the buffer.
#[derive(Debug, Clone)]
pub struct DeleteQueue {
    tx: mpsc::UnboundedSender<PendingDelete>,
}

impl DeleteQueue {
    /// Accepts a deletion for processing on the next flush.
    ///
    /// Fire-and-forget: if the worker has already stopped, the request is
    /// logged and dropped.
    pub fn enqueue(&self, pending: PendingDelete) {
        if let Err(e) = self.tx.send(pending) {
            warn!(short_url = %e.0.short_url, "Delete worker stopped, request dropped");
        }
    }
}

/// Spawns the delete worker on the current tokio runtime.
///
/// The worker runs until every [`DeleteQueue`] clone is dropped, then flushes
/// what is left and exits.
pub fn spawn_delete_worker(
    deleter: Arc<dyn BatchDeletable>,
    flush_interval: Duration,
) -> (DeleteQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_delete_worker(rx, deleter, flush_interval));

    (DeleteQueue { tx }, handle)
}

pub async fn run_delete_worker(
    mut rx: mpsc::UnboundedReceiver<PendingDelete>,
    deleter: Arc<dyn BatchDeletable>,
    flush_interval: Duration,
) {
    let mut ticker = time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut pending: Vec<PendingDelete> = Vec::new();

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(request) => pending.push(request),
                None => {
                    debug!("Delete queue closed, final flush");
                    flush(deleter.as_ref(), &mut pending).await;
                    break;
                }
            },
            _ = ticker.tick() => flush(deleter.as_ref(), &mut pending).await,
        }
    }
}

async fn flush(deleter: &dyn BatchDeletable, pending: &mut Vec<PendingDelete>) {
    if pending.is_empty() {
        return;
    }

    let batch = std::mem::take(pending);

    // TODO: record failed batches somewhere instead of dropping them.
    match deleter.delete_urls(&batch).await {
        Ok(()) => info!(count = batch.len(), "Deleted URLs"),
        Err(e) => error!(count = batch.len(), error = %e, "Failed to delete URLs, batch dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockBatchDeletable;
    use crate::error::StoreError;

    fn pending(code: &str) -> PendingDelete {
        PendingDelete::new(code, "user-1")
    }

    #[tokio::test(start_paused = true)]
    async fn test_flushes_buffer_on_tick() {
        let mut deleter = MockBatchDeletable::new();
        deleter
            .expect_delete_urls()
            .withf(|batch| batch.len() == 3 && batch[0].short_url == "aaaa1111")
            .times(1)
            .returning(|_| Ok(()));

        let (queue, handle) = spawn_delete_worker(Arc::new(deleter), DEFAULT_FLUSH_INTERVAL);

        queue.enqueue(pending("aaaa1111"));
        queue.enqueue(pending("bbbb2222"));
        queue.enqueue(pending("cccc3333"));

        time::sleep(Duration::from_secs(11)).await;

        drop(queue);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_buffer_never_flushes() {
        let mut deleter = MockBatchDeletable::new();
        deleter.expect_delete_urls().times(0);

        let (queue, handle) = spawn_delete_worker(Arc::new(deleter), DEFAULT_FLUSH_INTERVAL);

        time::sleep(Duration::from_secs(35)).await;

        drop(queue);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_drops_batch() {
        let mut deleter = MockBatchDeletable::new();
        deleter
            .expect_delete_urls()
            .withf(|batch| batch.len() == 2)
            .times(1)
            .returning(|_| Err(StoreError::Io(std::io::Error::other("connection reset"))));
        deleter
            .expect_delete_urls()
            .withf(|batch| batch.len() == 1 && batch[0].short_url == "cccc3333")
            .times(1)
            .returning(|_| Ok(()));

        let (queue, handle) = spawn_delete_worker(Arc::new(deleter), DEFAULT_FLUSH_INTERVAL);

        queue.enqueue(pending("aaaa1111"));
        queue.enqueue(pending("bbbb2222"));
        time::sleep(Duration::from_millis(10_500)).await;

        // The failed pair is not retried; only the new request is flushed.
        queue.enqueue(pending("cccc3333"));
        time::sleep(Duration::from_secs(10)).await;

        drop(queue);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_between_ticks_are_coalesced() {
        let mut deleter = MockBatchDeletable::new();
        deleter
            .expect_delete_urls()
            .withf(|batch| batch.len() == 4)
            .times(1)
            .returning(|_| Ok(()));

        let (queue, handle) = spawn_delete_worker(Arc::new(deleter), DEFAULT_FLUSH_INTERVAL);

        for (i, code) in ["aaaa1111", "bbbb2222", "cccc3333", "dddd4444"]
            .into_iter()
            .enumerate()
        {
            let producer = queue.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_secs(i as u64 * 2)).await;
                producer.enqueue(pending(code));
            });
        }

        time::sleep(Duration::from_secs(10) + Duration::from_millis(500)).await;

        drop(queue);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_queue_flushes_remaining() {
        let mut deleter = MockBatchDeletable::new();
        deleter
            .expect_delete_urls()
            .withf(|batch| batch.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        let (queue, handle) = spawn_delete_worker(Arc::new(deleter), DEFAULT_FLUSH_INTERVAL);

        queue.enqueue(pending("aaaa1111"));
        drop(queue);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_stopped_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let queue = DeleteQueue { tx };
        queue.enqueue(pending("aaaa1111"));
    }
}
