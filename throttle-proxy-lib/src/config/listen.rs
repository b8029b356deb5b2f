use serde::Deserialize;

/// Listener configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ListenConfig {
    /// Host or IP address to bind
    /// Default: "127.0.0.1"
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to bind, 0 picks an ephemeral port
    /// Default: 8888
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ListenConfig {
    /// `host:port`, with IPv6 literals bracketed
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}
