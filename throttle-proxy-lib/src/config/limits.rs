use serde::Deserialize;

/// Throughput limits in kilobits per second (1 kbit = 1000 bits)
///
/// A value of zero or less refuses the direction: connections are closed
/// without relaying any payload that way.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Client -> server limit
    /// Default: 1000.0
    #[serde(default = "default_kbps")]
    pub upload_kbps: f64,
    /// Server -> client limit
    /// Default: 1000.0
    #[serde(default = "default_kbps")]
    pub download_kbps: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { upload_kbps: default_kbps(), download_kbps: default_kbps() }
    }
}

fn default_kbps() -> f64 {
    1000.0
}
