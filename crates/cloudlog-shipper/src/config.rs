//! Construction parameters for the delivery engine.

use std::env;
use std::time::Duration;

use crate::constants;
use crate::error::ConfigError;

/// Environment variable naming the log group (see [`Config::from_env`]).
pub const ENV_LOG_GROUP: &str = "CLOUDLOG_GROUP_NAME";
/// Environment variable for the optional stream-name prefix.
pub const ENV_STREAM_PREFIX: &str = "CLOUDLOG_STREAM_PREFIX";
/// Environment variable for the optional backend region.
pub const ENV_REGION: &str = "CLOUDLOG_REGION";
/// Environment variable overriding the flush interval, in seconds.
pub const ENV_FLUSH_INTERVAL_SECS: &str = "CLOUDLOG_FLUSH_INTERVAL_SECS";

/// Delivery engine configuration.
///
/// The log group name is the only required parameter; everything else
/// defaults to the limits and cadences in [`constants`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Target log group. Required; absence is a configuration error.
    pub log_group_name: String,
    /// Optional prefix for worker stream names. Each worker appends its
    /// own unique suffix regardless.
    pub log_stream_prefix: Option<String>,
    /// Backend region, passed through to the backend client.
    pub region: Option<String>,
    /// Connect timeout for the backend client.
    pub open_timeout: Duration,
    /// Read timeout for the backend client.
    pub read_timeout: Duration,
    /// Send a non-empty buffer after this long without a send.
    pub flush_interval: Duration,
    /// Queue wait before re-evaluating the time-based flush condition.
    pub poll_interval: Duration,
    /// Per-event message size cap; longer messages are truncated.
    pub max_event_bytes: usize,
    /// Cumulative batch size cap, including per-event overhead.
    pub max_batch_bytes: usize,
    /// Event count cap per batch.
    pub max_batch_events: usize,
}

impl Config {
    /// Creates a configuration with defaults for everything but the
    /// required log group name.
    pub fn new(log_group_name: impl Into<String>) -> Result<Self, ConfigError> {
        let log_group_name = log_group_name.into();
        if log_group_name.trim().is_empty() {
            return Err(ConfigError::LogGroupNameRequired);
        }
        Ok(Self {
            log_group_name,
            log_stream_prefix: None,
            region: None,
            open_timeout: constants::DEFAULT_BACKEND_TIMEOUT,
            read_timeout: constants::DEFAULT_BACKEND_TIMEOUT,
            flush_interval: constants::FLUSH_INTERVAL,
            poll_interval: constants::POLL_INTERVAL,
            max_event_bytes: constants::MAX_EVENT_BYTES,
            max_batch_bytes: constants::MAX_BATCH_BYTES,
            max_batch_events: constants::MAX_BATCH_EVENTS,
        })
    }

    /// Reads configuration from `CLOUDLOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let group = env::var(ENV_LOG_GROUP).map_err(|_| ConfigError::LogGroupNameRequired)?;
        let mut config = Self::new(group)?;
        config.log_stream_prefix = env::var(ENV_STREAM_PREFIX).ok();
        config.region = env::var(ENV_REGION).ok();
        if let Ok(raw) = env::var(ENV_FLUSH_INTERVAL_SECS) {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_FLUSH_INTERVAL_SECS,
                value: raw,
            })?;
            config.flush_interval = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
