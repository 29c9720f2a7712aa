//! # cloudlog-shipper
//!
//! Asynchronous, batching delivery of application log events to a remote
//! append-only log-stream backend.
//!
//! Producers hand individual [`LogEvent`]s to a [`DeliverySupervisor`];
//! a background worker batches them under byte, count, and time thresholds
//! and ships each batch to an abstract [`LogBackend`], driving the
//! backend's monotonic sequence-token protocol and recovering from stale
//! tokens and missing streams along the way.
//!
//! ## Architecture
//!
//! ```text
//!   Producers
//!       │ deliver()
//!       v
//!   ┌────────────────────┐
//!   │ DeliverySupervisor │ (liveness check, worker restart)
//!   └─────────┬──────────┘
//!             │ unbounded queue
//!             v
//!   ┌────────────────────┐
//!   │   DeliveryWorker   │ (batching, flush policy, sequence tokens)
//!   └─────────┬──────────┘
//!             │ put_batch
//!             v
//!   ┌────────────────────┐
//!   │     LogBackend     │ (remote service adapter)
//!   └────────────────────┘
//! ```
//!
//! The supervisor owns exactly one live worker at a time and transparently
//! replaces it if its task is gone, so `deliver` keeps working even after
//! the original worker's execution context has died.
//!
//! Delivery is best effort: buffered events are flushed on
//! [`DeliverySupervisor::shutdown`], but nothing is persisted across
//! process restarts and exactly-once delivery is not attempted.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

/// Abstract ingestion backend capability and its retry contract
pub mod backend;

/// In-memory accumulation of pending events with byte-size accounting
pub mod batch;

/// Construction parameters and validation
pub mod config;

/// Batch limits and cadence defaults
pub mod constants;

/// Error taxonomy
pub mod error;

/// Log event type and per-event truncation
pub mod event;

/// Per-worker stream identity resolution
pub mod stream;

/// Supervisor owning and healing the single delivery worker
pub mod supervisor;

pub(crate) mod worker;

pub use backend::{BackendError, LogBackend, PutBatchOutput, RejectedEventsInfo};
pub use config::Config;
pub use error::{ConfigError, DeliveryError};
pub use event::LogEvent;
pub use stream::StreamIdentity;
pub use supervisor::DeliverySupervisor;
