//! Batch limits and cadence defaults for the delivery engine.
//!
//! The byte limits sit deliberately below the backend's documented caps so
//! that request framing and per-event overhead never push a payload over
//! the real limit.

use std::time::Duration;

/// Maximum size in bytes of a single event message before truncation.
///
/// Messages longer than this are truncated, never rejected, so a single
/// oversized event can never block the pipeline.
pub const MAX_EVENT_BYTES: usize = 948_000;

/// Maximum cumulative batch size in bytes.
///
/// Kept under the backend's true request limit to leave margin for the
/// per-event overhead it charges on top of the raw message bytes.
pub const MAX_BATCH_BYTES: usize = 1_000_000;

/// Maximum number of events per batch.
///
/// The backend accepts up to 10,000 events per write; 5,000 keeps batches
/// comfortably inside that bound.
pub const MAX_BATCH_EVENTS: usize = 5_000;

/// Fixed overhead in bytes the backend charges per event on top of the
/// message payload.
pub const PER_EVENT_OVERHEAD_BYTES: usize = 26;

/// Send a non-empty buffer once this long has passed since the last
/// successful send.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// How long the worker waits on its queue before re-evaluating the
/// time-based flush condition. Bounds worst-case added latency between
/// enqueue and delivery attempt when the queue is idle.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default connect/read timeout for the backend client.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Corrected-token retries allowed before a send is declared fatal.
///
/// The protocol always supplies the correct token with the rejection, so
/// in practice one retry suffices; the cap guards against a misbehaving
/// backend.
pub(crate) const SEQUENCE_TOKEN_RETRY_LIMIT: usize = 5;

/// Attempts allowed for a batch send against transient transport errors.
pub(crate) const SEND_RETRY_COUNT: usize = 3;
