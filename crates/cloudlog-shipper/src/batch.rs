//! In-memory accumulation of pending log events.
//!
//! The buffer keeps a running byte total (message bytes plus the fixed
//! per-event overhead the backend charges) so the flush policy never has
//! to rescan the events. It is owned exclusively by the delivery worker;
//! no locking is involved.

use std::time::Duration;

use crate::constants::PER_EVENT_OVERHEAD_BYTES;
use crate::event::LogEvent;

/// Ordered batch of pending events with cached cumulative byte size.
#[derive(Debug)]
pub struct BatchBuffer {
    events: Vec<LogEvent>,
    byte_size: usize,
    max_batch_bytes: usize,
    max_batch_events: usize,
}

impl BatchBuffer {
    #[must_use]
    pub fn new(max_batch_bytes: usize, max_batch_events: usize) -> Self {
        Self {
            events: Vec::new(),
            byte_size: 0,
            max_batch_bytes,
            max_batch_events,
        }
    }

    /// Appends an event, charging its message bytes plus the per-event
    /// overhead against the running total.
    pub fn push(&mut self, event: LogEvent) {
        self.byte_size += Self::charge(event.message_len());
        self.events.push(event);
    }

    /// Whether the buffer should be sent before accepting a message of
    /// `incoming_bytes` more bytes. True when any of:
    ///
    /// - the incoming message would push the batch over its byte limit;
    /// - the buffer has been waiting longer than `flush_interval` since
    ///   the last successful send;
    /// - the event count has reached its limit.
    ///
    /// An empty buffer never flushes. Pass zero `incoming_bytes` to
    /// evaluate only the time and count conditions.
    #[must_use]
    pub fn should_flush(
        &self,
        incoming_bytes: usize,
        since_last_send: Duration,
        flush_interval: Duration,
    ) -> bool {
        if self.events.is_empty() {
            return false;
        }
        let incoming_charge = if incoming_bytes == 0 {
            0
        } else {
            Self::charge(incoming_bytes)
        };
        if self.byte_size + incoming_charge > self.max_batch_bytes {
            return true;
        }
        if since_last_send > flush_interval {
            return true;
        }
        self.events.len() >= self.max_batch_events
    }

    /// Takes all buffered events, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<LogEvent> {
        self.byte_size = 0;
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    fn charge(message_bytes: usize) -> usize {
        message_bytes + PER_EVENT_OVERHEAD_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_WAIT: Duration = Duration::ZERO;
    const INTERVAL: Duration = Duration::from_secs(5);

    fn event_of(bytes: usize) -> LogEvent {
        LogEvent::new(0, "x".repeat(bytes))
    }

    #[test]
    fn test_push_accounts_overhead() {
        let mut buffer = BatchBuffer::new(10_000, 100);
        buffer.push(event_of(100));
        buffer.push(event_of(50));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.byte_size(), 150 + 2 * PER_EVENT_OVERHEAD_BYTES);
    }

    #[test]
    fn test_empty_buffer_never_flushes() {
        let buffer = BatchBuffer::new(100, 1);
        assert!(!buffer.should_flush(0, INTERVAL * 10, INTERVAL));
        assert!(!buffer.should_flush(10_000, INTERVAL * 10, INTERVAL));
    }

    #[test]
    fn test_flush_on_byte_limit() {
        let mut buffer = BatchBuffer::new(1_000, 100);
        buffer.push(event_of(400));
        buffer.push(event_of(400));
        // 852 bytes buffered; another 400-byte message would exceed 1,000.
        assert!(buffer.should_flush(400, NO_WAIT, INTERVAL));
        // A tiny message still fits.
        assert!(!buffer.should_flush(10, NO_WAIT, INTERVAL));
    }

    #[test]
    fn test_flush_on_elapsed_interval() {
        let mut buffer = BatchBuffer::new(10_000, 100);
        buffer.push(event_of(10));
        assert!(!buffer.should_flush(0, Duration::from_secs(4), INTERVAL));
        assert!(buffer.should_flush(0, Duration::from_secs(6), INTERVAL));
    }

    #[test]
    fn test_flush_on_event_count() {
        let mut buffer = BatchBuffer::new(1_000_000, 3);
        buffer.push(event_of(1));
        buffer.push(event_of(1));
        assert!(!buffer.should_flush(0, NO_WAIT, INTERVAL));
        buffer.push(event_of(1));
        assert!(buffer.should_flush(0, NO_WAIT, INTERVAL));
    }

    #[test]
    fn test_take_drains_and_resets() {
        let mut buffer = BatchBuffer::new(10_000, 100);
        buffer.push(LogEvent::new(1, "first"));
        buffer.push(LogEvent::new(2, "second"));

        let events = buffer.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[1].message, "second");
        assert!(buffer.is_empty());
        assert_eq!(buffer.byte_size(), 0);
    }

    #[test]
    fn test_take_preserves_order_across_batches() {
        let mut buffer = BatchBuffer::new(10_000, 100);
        buffer.push(LogEvent::new(1, "a"));
        buffer.push(LogEvent::new(2, "b"));
        let first = buffer.take();
        buffer.push(LogEvent::new(3, "c"));
        let second = buffer.take();

        let messages: Vec<&str> = first
            .iter()
            .chain(second.iter())
            .map(|event| event.message.as_str())
            .collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }
}
