//! Abstract ingestion backend capability.
//!
//! The production client (authentication, signing, HTTP transport) is an
//! external collaborator; the delivery engine only depends on this trait.
//! The retry contract is part of the interface because the worker's
//! control flow hangs off it: a stale sequence token comes back as a
//! structured [`BackendError::InvalidSequenceToken`] carrying the token to
//! use instead, never as an error string to parse.

use std::fmt;

use async_trait::async_trait;

use crate::event::LogEvent;

/// Indices of events the backend accepted the request for but declined to
/// ingest, as reported in the write response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectedEventsInfo {
    /// First event whose timestamp is too far in the future.
    pub too_new_start_index: Option<usize>,
    /// Last event whose timestamp is too far in the past.
    pub too_old_end_index: Option<usize>,
    /// Last event past the stream's retention window.
    pub expired_end_index: Option<usize>,
}

impl RejectedEventsInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.too_new_start_index.is_none()
            && self.too_old_end_index.is_none()
            && self.expired_end_index.is_none()
    }
}

impl fmt::Display for RejectedEventsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "too_new_start={:?} too_old_end={:?} expired_end={:?}",
            self.too_new_start_index, self.too_old_end_index, self.expired_end_index
        )
    }
}

/// Successful `put_batch` response.
#[derive(Debug, Clone, Default)]
pub struct PutBatchOutput {
    /// Token to supply on the next write to the same stream.
    pub next_sequence_token: Option<String>,
    /// Present when the backend declined to ingest some events.
    pub rejected_info: Option<RejectedEventsInfo>,
}

/// Failures reported by the ingestion backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The supplied sequence token is stale. `expected` carries the token
    /// the backend wants on the retry.
    #[error("invalid sequence token, expected {expected:?}")]
    InvalidSequenceToken { expected: Option<String> },

    #[error("log group or stream not found")]
    NotFound,

    #[error("resource already exists")]
    AlreadyExists,

    #[error("access denied")]
    AccessDenied,

    /// Transient transport failure (connection error, timeout, 5xx).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Remote log-ingestion service: named log groups containing ordered log
/// streams, each stream gated by a monotonically advancing sequence token.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Creates a log group. Idempotence is not assumed; callers absorb
    /// [`BackendError::AlreadyExists`].
    async fn create_group(&self, group: &str) -> Result<(), BackendError>;

    /// Creates a log stream within `group`. Fails with
    /// [`BackendError::NotFound`] when the group itself is missing.
    async fn create_stream(&self, group: &str, stream: &str) -> Result<(), BackendError>;

    /// Writes an ordered batch of events to `stream`, supplying the
    /// sequence token returned by the previous write (or none for the
    /// first write to a fresh stream).
    async fn put_batch(
        &self,
        group: &str,
        stream: &str,
        events: &[LogEvent],
        sequence_token: Option<&str>,
    ) -> Result<PutBatchOutput, BackendError>;
}
