use std::time::Duration;

use serde::Deserialize;

/// Timeout configuration
///
/// Established sessions are never timed out; an idle tunnel stays open until
/// one of its peers closes it.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Upstream connect timeout in milliseconds, 0 waits for the OS
    /// Default: 10000 (10 seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
    /// Delay before the single retry when the listen port is already bound
    /// Default: 1000 (1 second)
    #[serde(default = "default_bind_retry")]
    pub bind_retry_ms: u64,
    /// How long in-flight sessions may drain after a shutdown signal, in seconds
    /// Default: 30
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            bind_retry_ms: default_bind_retry(),
            shutdown_secs: default_shutdown_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        (self.connect_ms > 0).then(|| Duration::from_millis(self.connect_ms))
    }

    pub fn bind_retry(&self) -> Duration {
        Duration::from_millis(self.bind_retry_ms)
    }

    pub fn shutdown(&self) -> Duration {
        Duration::from_secs(self.shutdown_secs)
    }
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_bind_retry() -> u64 {
    1000
}

fn default_shutdown_timeout() -> u64 {
    30
}
