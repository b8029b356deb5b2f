use std::fmt;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Port assumed for a CONNECT target without one
pub const CONNECT_DEFAULT_PORT: u16 = 443;

/// Port assumed for a `Host:` header without one
pub const HTTP_DEFAULT_PORT: u16 = 80;

/// Upstream host and port a session connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Split `host[:port]` on the first colon.
    ///
    /// A missing or unparseable port falls back to `default_port`. Bracketed
    /// IPv6 literals (`[::1]:8443`) are unwrapped. Returns `None` for an empty
    /// host.
    pub fn parse(authority: &str, default_port: u16) -> Option<Self> {
        let authority = authority.trim();

        let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
            let (host, after) = rest.split_once(']')?;
            let port = after.strip_prefix(':').and_then(|p| p.parse::<u16>().ok());
            (host, port)
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, port.parse::<u16>().ok()),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return None;
        }
        Some(Self { host: host.to_string(), port: port.unwrap_or(default_port) })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Open a TCP connection, giving up after `deadline` when one is set.
    pub async fn connect(&self, deadline: Option<Duration>) -> io::Result<TcpStream> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let stream = match deadline {
            Some(limit) => timeout(limit, connect).await.map_err(|_| {
                io::Error::new(io::ErrorKind::TimedOut, format!("connect to {self} timed out"))
            })??,
            None => connect.await?,
        };
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
