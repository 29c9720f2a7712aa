//! Shared mock ingestion backend for integration tests.

use std::sync::Arc;

use tokio::sync::Mutex;

use cloudlog_shipper::{BackendError, LogBackend, LogEvent, PutBatchOutput, RejectedEventsInfo};

#[derive(Debug, Default)]
pub struct MockState {
    /// Every accepted write: the events and the token that accompanied
    /// them.
    pub puts: Vec<(Vec<LogEvent>, Option<String>)>,
    pub create_group_calls: Vec<String>,
    pub create_stream_calls: Vec<(String, String)>,
    /// Remaining `create_stream` calls to fail with not-found.
    pub stream_not_found_remaining: usize,
    /// Remaining `put_batch` calls to fail with a stale-token error.
    pub invalid_token_remaining: usize,
    /// Token embedded in the stale-token error.
    pub corrected_token: Option<String>,
    /// Rejection info to attach to the next accepted write.
    pub reject_next: Option<RejectedEventsInfo>,
    token_counter: usize,
}

/// In-process ingestion backend that records every call and can be primed
/// with the failures the delivery engine must recover from.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub state: Mutex<MockState>,
}

impl MockBackend {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn put_count(&self) -> usize {
        self.state.lock().await.puts.len()
    }

    pub async fn delivered_messages(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .puts
            .iter()
            .flat_map(|(events, _)| events.iter().map(|event| event.message.clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl LogBackend for MockBackend {
    async fn create_group(&self, group: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.create_group_calls.push(group.to_string());
        Ok(())
    }

    async fn create_stream(&self, group: &str, stream: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state
            .create_stream_calls
            .push((group.to_string(), stream.to_string()));
        if state.stream_not_found_remaining > 0 {
            state.stream_not_found_remaining -= 1;
            return Err(BackendError::NotFound);
        }
        Ok(())
    }

    async fn put_batch(
        &self,
        _group: &str,
        _stream: &str,
        events: &[LogEvent],
        sequence_token: Option<&str>,
    ) -> Result<PutBatchOutput, BackendError> {
        let mut state = self.state.lock().await;
        if state.invalid_token_remaining > 0 {
            state.invalid_token_remaining -= 1;
            return Err(BackendError::InvalidSequenceToken {
                expected: state.corrected_token.clone(),
            });
        }
        state
            .puts
            .push((events.to_vec(), sequence_token.map(str::to_string)));
        state.token_counter += 1;
        Ok(PutBatchOutput {
            next_sequence_token: Some(format!("token-{}", state.token_counter)),
            rejected_info: state.reject_next.take(),
        })
    }
}
