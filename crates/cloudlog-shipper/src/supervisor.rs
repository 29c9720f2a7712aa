//! Supervisor owning the single live delivery worker.
//!
//! Producers call [`DeliverySupervisor::deliver`]; the supervisor checks
//! that its worker task is still alive first and transparently starts a
//! replacement if it is not. The liveness check is what heals a worker
//! whose execution context died out from under it: a panic, a fatal
//! delivery error, or a fork that did not carry the task along.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::backend::LogBackend;
use crate::config::Config;
use crate::error::DeliveryError;
use crate::event::LogEvent;
use crate::worker::{DeliveryWorker, QueueItem};

struct WorkerHandle {
    tx: UnboundedSender<QueueItem>,
    join: JoinHandle<Result<(), DeliveryError>>,
}

impl WorkerHandle {
    fn spawn(backend: Arc<dyn LogBackend>, config: Arc<Config>) -> Self {
        let (worker, tx) = DeliveryWorker::new(backend, config);
        let join = tokio::spawn(async move {
            let result = worker.run().await;
            if let Err(ref err) = result {
                error!(%err, "delivery worker exited with error");
            }
            result
        });
        Self { tx, join }
    }

    fn is_alive(&self) -> bool {
        !self.join.is_finished()
    }
}

/// Entry point for producers. Cheap to share behind an [`Arc`]; `deliver`
/// never blocks beyond the hand-off itself.
///
/// Exactly one worker is considered current at a time. However many
/// workers are created over the process lifetime, the supervisor owns
/// them all and only ever hands messages to the latest.
pub struct DeliverySupervisor {
    backend: Arc<dyn LogBackend>,
    config: Arc<Config>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl DeliverySupervisor {
    /// Starts the first delivery worker. Must be called from within a
    /// tokio runtime.
    #[must_use]
    pub fn new(backend: Arc<dyn LogBackend>, config: Config) -> Self {
        let config = Arc::new(config);
        let worker = WorkerHandle::spawn(Arc::clone(&backend), Arc::clone(&config));
        Self {
            backend,
            config,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueues one event for delivery.
    ///
    /// A dead worker is replaced before the hand-off. If the hand-off
    /// still fails because the worker died in between, the stale worker
    /// is discarded and the hand-off retried with a fresh one exactly
    /// once; a second failure surfaces
    /// [`DeliveryError::WorkerUnavailable`].
    pub async fn deliver(&self, event: LogEvent) -> Result<(), DeliveryError> {
        let mut guard = self.worker.lock().await;

        if guard.as_ref().map_or(true, |handle| !handle.is_alive()) {
            debug!("delivery worker not alive, starting a replacement");
            *guard = Some(self.spawn_worker());
        }
        let Some(handle) = guard.as_mut() else {
            return Err(DeliveryError::WorkerUnavailable);
        };

        let Err(failed) = handle.tx.send(QueueItem::Event(event)) else {
            return Ok(());
        };

        // The worker died between the liveness check and the hand-off.
        // Kill the stale handle, start fresh, and retry once; retrying
        // unboundedly would risk an infinite loop.
        warn!("worker hand-off raced with a dying worker, replacing it");
        if let Some(stale) = guard.take() {
            stale.join.abort();
        }
        let fresh = self.spawn_worker();
        let retry = fresh.tx.send(failed.0);
        *guard = Some(fresh);
        retry.map_err(|_| DeliveryError::WorkerUnavailable)
    }

    /// Flushes buffered events and terminates the current worker.
    ///
    /// Events enqueued after this call are dropped. Idempotent: a second
    /// shutdown is a no-op. The caller must await this before process
    /// exit or buffered events are lost.
    pub async fn shutdown(&self) -> Result<(), DeliveryError> {
        let mut guard = self.worker.lock().await;
        let Some(handle) = guard.take() else {
            return Ok(());
        };
        // A send error just means the worker is already gone; join it
        // either way to surface its exit status.
        let _ = handle.tx.send(QueueItem::Shutdown);
        match handle.join.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(%join_err, "delivery worker task did not join cleanly");
                Err(DeliveryError::WorkerUnavailable)
            }
        }
    }

    fn spawn_worker(&self) -> WorkerHandle {
        WorkerHandle::spawn(Arc::clone(&self.backend), Arc::clone(&self.config))
    }
}
