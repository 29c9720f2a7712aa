//! Per-worker stream identity resolution.

use uuid::Uuid;

/// Names identifying where a worker writes.
///
/// Resolved once per worker lifetime at connect time and immutable
/// thereafter. The sequence token is worker-local state, so each worker
/// gets a unique stream suffix; two workers writing the same stream would
/// invalidate each other's tokens on every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIdentity {
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl StreamIdentity {
    /// Resolves the stream name for a new worker: the optional caller
    /// prefix plus a random per-worker suffix.
    #[must_use]
    pub fn resolve(log_group_name: &str, stream_prefix: Option<&str>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let log_stream_name = match stream_prefix {
            Some(prefix) => format!("{prefix}/{suffix}"),
            None => suffix,
        };
        Self {
            log_group_name: log_group_name.to_string(),
            log_stream_name,
        }
    }
}
