//! Fire-and-forget job dispatch for webhook configuration.
//!
//! The installation flow's only contract here is "enqueue a
//! webhook-configuration request for store id X" - the HTTP response never
//! waits on it. Delivery is at-least-once: a failed job is re-enqueued up
//! to [`MAX_ATTEMPTS`] before being dropped with an error log.

use sqlx::PgPool;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use shopkeeper_core::StoreId;

use crate::db::{RepositoryError, StoreRepository};

/// Maximum delivery attempts per job.
pub const MAX_ATTEMPTS: u32 = 3;

/// Errors that can occur when enqueueing or processing a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The worker has shut down and the channel is closed.
    #[error("job queue is closed")]
    QueueClosed,

    /// Database access failed while processing a job.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A webhook-configuration job for one store.
#[derive(Debug, Clone)]
pub struct WebhookJob {
    /// Unique job id (stable across redelivery attempts).
    pub id: Uuid,
    /// Store to configure webhooks for.
    pub store_id: StoreId,
    /// Delivery attempt, starting at 1.
    pub attempt: u32,
}

impl WebhookJob {
    fn new(store_id: StoreId) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            attempt: 1,
        }
    }

    const fn retry(mut self) -> Self {
        self.attempt += 1;
        self
    }
}

/// Handle for enqueueing webhook-configuration jobs.
#[derive(Clone)]
pub struct JobQueue {
    tx: UnboundedSender<WebhookJob>,
}

impl JobQueue {
    /// Create a queue and the receiving end for its worker.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<WebhookJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a webhook-configuration job for a store.
    ///
    /// Returns the job id; the caller does not wait for processing.
    ///
    /// # Errors
    ///
    /// Returns `JobError::QueueClosed` if the worker has shut down.
    pub fn enqueue(&self, store_id: StoreId) -> Result<Uuid, JobError> {
        let job = WebhookJob::new(store_id);
        let id = job.id;
        self.tx.send(job).map_err(|_| JobError::QueueClosed)?;
        Ok(id)
    }

    fn requeue(&self, job: WebhookJob) -> Result<(), JobError> {
        self.tx.send(job).map_err(|_| JobError::QueueClosed)
    }
}

/// Spawn the worker task draining the webhook-configuration queue.
///
/// The worker owns a clone of the queue so failed jobs can be redelivered.
pub fn spawn_webhook_worker(
    pool: PgPool,
    queue: JobQueue,
    mut rx: UnboundedReceiver<WebhookJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match process(&pool, &job).await {
                Ok(()) => {}
                Err(e) if job.attempt < MAX_ATTEMPTS => {
                    warn!(
                        job_id = %job.id,
                        store_id = %job.store_id,
                        attempt = job.attempt,
                        error = %e,
                        "Webhook job failed, re-enqueueing"
                    );
                    if queue.requeue(job.retry()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(
                        job_id = %job.id,
                        store_id = %job.store_id,
                        attempts = job.attempt,
                        error = %e,
                        "Webhook job failed permanently"
                    );
                }
            }
        }
        info!("Webhook worker stopped");
    })
}

/// Process one webhook-configuration job.
///
/// Confirms the store still exists (an uninstall may have raced the queue)
/// and hands off to webhook registration.
#[instrument(skip(pool), fields(job_id = %job.id, store_id = %job.store_id))]
async fn process(pool: &PgPool, job: &WebhookJob) -> Result<(), JobError> {
    let Some(store) = StoreRepository::new(pool).get_by_id(job.store_id).await? else {
        warn!("Store no longer exists, dropping webhook job");
        return Ok(());
    };

    // TODO: register the app's webhook subscriptions via the platform API
    // once the topic list is finalized.
    info!(shop = %store.domain, "Webhook configuration dispatched");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_delivers_job() {
        let (queue, mut rx) = JobQueue::new();

        let job_id = queue.enqueue(StoreId::new(42)).unwrap();

        let job = rx.recv().await.unwrap();
        assert_eq!(job.id, job_id);
        assert_eq!(job.store_id, StoreId::new(42));
        assert_eq!(job.attempt, 1);
    }

    #[tokio::test]
    async fn test_enqueue_fails_when_receiver_dropped() {
        let (queue, rx) = JobQueue::new();
        drop(rx);

        assert!(matches!(
            queue.enqueue(StoreId::new(1)),
            Err(JobError::QueueClosed)
        ));
    }

    #[test]
    fn test_retry_increments_attempt_and_keeps_id() {
        let job = WebhookJob::new(StoreId::new(7));
        let id = job.id;

        let retried = job.retry();
        assert_eq!(retried.attempt, 2);
        assert_eq!(retried.id, id);
        assert!(retried.retry().attempt <= MAX_ATTEMPTS);
    }
}
