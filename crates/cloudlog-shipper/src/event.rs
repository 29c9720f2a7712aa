//! Log event type shared between producers and the delivery worker.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// A single log event as submitted by a producer.
///
/// The timestamp is capture time supplied by the caller, not send time;
/// the worker never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch at capture time.
    pub timestamp_millis: i64,
    /// The log line itself.
    pub message: String,
}

impl LogEvent {
    #[must_use]
    pub fn new(timestamp_millis: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
        }
    }

    /// Creates an event stamped with the current wall-clock time.
    #[must_use]
    pub fn now(message: impl Into<String>) -> Self {
        let timestamp_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            });
        Self::new(timestamp_millis, message)
    }

    /// Truncates the message to at most `max_bytes`, never splitting a
    /// UTF-8 character. Oversized messages are truncated rather than
    /// rejected so a single large event cannot block the pipeline.
    pub fn truncate_to(&mut self, max_bytes: usize) {
        if self.message.len() <= max_bytes {
            return;
        }
        let mut cut = max_bytes;
        while cut > 0 && !self.message.is_char_boundary(cut) {
            cut -= 1;
        }
        warn!(
            original_bytes = self.message.len(),
            truncated_bytes = cut,
            "log message exceeds per-event limit, truncating"
        );
        self.message.truncate(cut);
    }

    /// Message size in bytes, excluding backend overhead.
    #[must_use]
    pub fn message_len(&self) -> usize {
        self.message.len()
    }
}
