use serde::Deserialize;

use super::limits::LimitsConfig;
use super::listen::ListenConfig;
use super::telemetry::LoggingConfig;
use super::timeout::TimeoutConfig;
use crate::throttle::RateProfile;

/// Main configuration structure
///
/// Every section is optional; an empty file yields the same proxy as
/// running the binary without any flags.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the proxy listens on
    #[serde(default)]
    pub listen: ListenConfig,
    /// Upload/download throughput caps applied to every connection
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Timeout configuration
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// Largest request head (request line plus headers) accepted from a client, in bytes
    /// Default: 65536
    #[serde(default = "default_max_head_bytes")]
    pub max_head_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            timeout: TimeoutConfig::default(),
            max_head_bytes: default_max_head_bytes(),
        }
    }
}

impl Config {
    /// The process-wide rate profile derived from `[limits]`
    pub fn rate_profile(&self) -> RateProfile {
        RateProfile::new(self.limits.upload_kbps, self.limits.download_kbps)
    }
}

fn default_max_head_bytes() -> usize {
    64 * 1024
}
