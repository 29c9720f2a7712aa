//! Error taxonomy for configuration and delivery failures.
//!
//! Producers calling `deliver` see no error in the common case; the only
//! failures surfaced to callers are configuration errors at construction
//! time and an exhausted worker hand-off retry.

use crate::backend::{BackendError, RejectedEventsInfo};

/// Errors detected while validating construction parameters.
///
/// These are fatal at construction and never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("log group name is required")]
    LogGroupNameRequired,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Failures in the delivery pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The backend accepted a write but declined to ingest some of its
    /// events (too old, too new, or duplicate). The affected batch is not
    /// retried; this exists so operators can alert on the data loss.
    #[error("backend rejected log events: {info}")]
    EventsRejected { info: RejectedEventsInfo },

    /// The backend kept rejecting the sequence token even after adopting
    /// the corrected token it supplied.
    #[error("sequence token still rejected after {attempts} corrections")]
    SequenceTokenExhausted { attempts: usize },

    /// A batch was dropped after exhausting transport retries.
    #[error("batch send failed after {attempts} attempts: {source}")]
    SendFailed {
        attempts: usize,
        #[source]
        source: BackendError,
    },

    /// Creating the log group or stream failed in a way the worker does
    /// not absorb (e.g. a second consecutive not-found).
    #[error("stream provisioning failed: {0}")]
    Provisioning(#[source] BackendError),

    /// The hand-off to the worker failed twice in a row; the message was
    /// not enqueued.
    #[error("delivery worker unavailable")]
    WorkerUnavailable,
}
