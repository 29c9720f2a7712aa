//! The background delivery worker.
//!
//! One worker task owns the inbound queue's receiving half, the batch
//! buffer, and the stream's sequence token; nothing else touches them, so
//! the batch-building path needs no locks. The worker connects (creating
//! the group and stream on demand), drains the queue in bursts, sends when
//! the flush policy fires, and drains fully when it sees the shutdown
//! sentinel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, warn};

use crate::backend::{BackendError, LogBackend, PutBatchOutput};
use crate::batch::BatchBuffer;
use crate::config::Config;
use crate::constants::{SEND_RETRY_COUNT, SEQUENCE_TOKEN_RETRY_LIMIT};
use crate::error::DeliveryError;
use crate::event::LogEvent;
use crate::stream::StreamIdentity;

/// Entry on the worker's inbound queue.
#[derive(Debug)]
pub(crate) enum QueueItem {
    Event(LogEvent),
    /// Distinguished shutdown sentinel. The worker flushes its buffer and
    /// exits; entries enqueued after it are dropped.
    Shutdown,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct DeliveryWorker {
    rx: mpsc::UnboundedReceiver<QueueItem>,
    backend: Arc<dyn LogBackend>,
    config: Arc<Config>,
    stream: StreamIdentity,
    buffer: BatchBuffer,
    sequence_token: Option<String>,
    last_sent: Instant,
}

impl DeliveryWorker {
    pub(crate) fn new(
        backend: Arc<dyn LogBackend>,
        config: Arc<Config>,
    ) -> (Self, mpsc::UnboundedSender<QueueItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream =
            StreamIdentity::resolve(&config.log_group_name, config.log_stream_prefix.as_deref());
        let buffer = BatchBuffer::new(config.max_batch_bytes, config.max_batch_events);
        let worker = Self {
            rx,
            backend,
            config,
            stream,
            buffer,
            sequence_token: None,
            last_sent: Instant::now(),
        };
        (worker, tx)
    }

    /// Runs until the shutdown sentinel has been processed (or every
    /// sender is gone), flushing any buffered events first.
    pub(crate) async fn run(mut self) -> Result<(), DeliveryError> {
        self.connect().await?;
        debug!(
            group = %self.stream.log_group_name,
            stream = %self.stream.log_stream_name,
            "delivery worker ready"
        );

        'poll: loop {
            // Time-based flush with zero new bytes pending.
            if self
                .buffer
                .should_flush(0, self.last_sent.elapsed(), self.config.flush_interval)
            {
                self.send_buffer().await?;
            }

            match timeout(self.config.poll_interval, self.rx.recv()).await {
                Ok(Some(item)) => {
                    if self.process(item).await? == Flow::Stop {
                        break 'poll;
                    }
                    // Drain whatever else is already queued, bounded by a
                    // snapshot of the queue length so a fast producer
                    // cannot pin us here.
                    let pending = self.rx.len();
                    for _ in 0..pending {
                        let Ok(item) = self.rx.try_recv() else {
                            break;
                        };
                        if self.process(item).await? == Flow::Stop {
                            break 'poll;
                        }
                    }
                }
                Ok(None) => {
                    // Every sender is gone without a sentinel; flush what
                    // we have and stop.
                    debug!("inbound queue closed, draining buffer");
                    if !self.buffer.is_empty() {
                        self.send_buffer().await?;
                    }
                    break 'poll;
                }
                // Idle wakeup; the loop re-evaluates the time condition.
                Err(_) => {}
            }
        }

        debug!("delivery worker terminated");
        Ok(())
    }

    async fn process(&mut self, item: QueueItem) -> Result<Flow, DeliveryError> {
        match item {
            QueueItem::Shutdown => {
                debug!("shutdown sentinel received, draining buffer");
                if !self.buffer.is_empty() {
                    self.send_buffer().await?;
                }
                Ok(Flow::Stop)
            }
            QueueItem::Event(mut event) => {
                event.truncate_to(self.config.max_event_bytes);
                if self.buffer.should_flush(
                    event.message_len(),
                    self.last_sent.elapsed(),
                    self.config.flush_interval,
                ) {
                    self.send_buffer().await?;
                }
                self.buffer.push(event);
                Ok(Flow::Continue)
            }
        }
    }

    /// Ensures the stream exists, creating the log group first if the
    /// backend reports it missing. A second consecutive not-found
    /// propagates; already-exists and access-denied are absorbed, since
    /// an unusable stream surfaces more informatively on the first send.
    async fn connect(&mut self) -> Result<(), DeliveryError> {
        let group = &self.stream.log_group_name;
        let stream = &self.stream.log_stream_name;
        match self.backend.create_stream(group, stream).await {
            Ok(()) | Err(BackendError::AlreadyExists | BackendError::AccessDenied) => Ok(()),
            Err(BackendError::NotFound) => {
                debug!(%group, "log group missing, creating it");
                match self.backend.create_group(group).await {
                    Ok(()) | Err(BackendError::AlreadyExists) => {}
                    Err(err) => return Err(DeliveryError::Provisioning(err)),
                }
                match self.backend.create_stream(group, stream).await {
                    Ok(()) | Err(BackendError::AlreadyExists | BackendError::AccessDenied) => {
                        Ok(())
                    }
                    Err(err) => Err(DeliveryError::Provisioning(err)),
                }
            }
            Err(err) => Err(DeliveryError::Provisioning(err)),
        }
    }

    /// Sends the current buffer. Rejected events and exhausted transport
    /// retries are logged and absorbed (the batch is lost, the loop
    /// continues); an exhausted sequence-token correction is fatal for
    /// the worker.
    async fn send_buffer(&mut self) -> Result<(), DeliveryError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let events = self.buffer.take();
        match self.put_with_token_correction(&events).await {
            Ok(output) => {
                self.sequence_token = output.next_sequence_token;
                self.last_sent = Instant::now();
                if let Some(info) = output.rejected_info.filter(|info| !info.is_empty()) {
                    // Distinct error kind so operators can alert on the
                    // data loss; the batch is not re-queued.
                    let err = DeliveryError::EventsRejected { info };
                    error!(%err, events = events.len(), "backend rejected events in accepted batch");
                }
                Ok(())
            }
            Err(err @ DeliveryError::SendFailed { .. }) => {
                error!(%err, dropped = events.len(), "dropping batch after failed delivery");
                self.last_sent = Instant::now();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn put_with_token_correction(
        &mut self,
        events: &[LogEvent],
    ) -> Result<PutBatchOutput, DeliveryError> {
        let mut transport_attempts = 0;
        let mut token_corrections = 0;
        loop {
            let result = self
                .backend
                .put_batch(
                    &self.stream.log_group_name,
                    &self.stream.log_stream_name,
                    events,
                    self.sequence_token.as_deref(),
                )
                .await;
            match result {
                Ok(output) => return Ok(output),
                Err(BackendError::InvalidSequenceToken { expected }) => {
                    token_corrections += 1;
                    if token_corrections >= SEQUENCE_TOKEN_RETRY_LIMIT {
                        return Err(DeliveryError::SequenceTokenExhausted {
                            attempts: token_corrections,
                        });
                    }
                    debug!(?expected, "adopting corrected sequence token");
                    self.sequence_token = expected;
                }
                Err(err) => {
                    transport_attempts += 1;
                    if transport_attempts >= SEND_RETRY_COUNT {
                        return Err(DeliveryError::SendFailed {
                            attempts: transport_attempts,
                            source: err,
                        });
                    }
                    warn!(%err, attempt = transport_attempts, "batch send failed, retrying");
                }
            }
        }
    }
}
