use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::proxy::relay::{relay, RelayReport};
use crate::proxy::target::Target;
use crate::throttle::{Direction, Limiter, RateProfile};

/// Per-process settings every session reads; immutable after startup.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub profile: RateProfile,
    pub connect_timeout: Option<Duration>,
    pub max_head_bytes: usize,
}

impl SessionContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            profile: config.rate_profile(),
            connect_timeout: config.timeout.connect(),
            max_head_bytes: config.max_head_bytes,
        }
    }
}

/// Why a handler gave up before relaying
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("request has no usable Host header")]
    MissingHost,
    #[error("upstream {target} unreachable: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("client went away during handshake: {0}")]
    Client(std::io::Error),
}

/// What each direction did. The direction that was cancelled is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub upload: Option<RelayReport>,
    pub download: Option<RelayReport>,
}

impl SessionReport {
    pub fn uploaded(&self) -> u64 {
        self.upload.map(|r| r.bytes).unwrap_or_default()
    }

    pub fn downloaded(&self) -> u64 {
        self.download.map(|r| r.bytes).unwrap_or_default()
    }
}

/// Run both directions until the first one finishes, then cancel the other.
///
/// Each direction gets a fresh limiter from `profile`. All four halves are
/// owned by the relay tasks, so every socket is closed by the time this
/// returns, whichever side ended first.
pub async fn run_relays<CR, CW, UR, UW>(
    client_reader: CR,
    client_writer: CW,
    upstream_reader: UR,
    upstream_writer: UW,
    profile: &RateProfile,
) -> SessionReport
where
    CR: AsyncRead + Unpin + Send + 'static,
    CW: AsyncWrite + Unpin + Send + 'static,
    UR: AsyncRead + Unpin + Send + 'static,
    UW: AsyncWrite + Unpin + Send + 'static,
{
    let upload = Limiter::new(profile.kbps(Direction::Upload));
    let download = Limiter::new(profile.kbps(Direction::Download));

    let mut relays = JoinSet::new();
    relays.spawn(relay(client_reader, upstream_writer, upload, Direction::Upload));
    relays.spawn(relay(upstream_reader, client_writer, download, Direction::Download));

    let mut report = SessionReport::default();
    if let Some(first) = relays.join_next().await {
        record(&mut report, first);
    }
    relays.abort_all();
    while let Some(rest) = relays.join_next().await {
        record(&mut report, rest);
    }
    report
}

fn record(report: &mut SessionReport, joined: Result<RelayReport, tokio::task::JoinError>) {
    match joined {
        Ok(r) => {
            debug!(direction = %r.direction, bytes = r.bytes, end = ?r.end, "relay finished");
            match r.direction {
                Direction::Upload => report.upload = Some(r),
                Direction::Download => report.download = Some(r),
            }
        }
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!(error = %e, "relay task panicked"),
    }
}

/// Connect to `target`, mapping failure into [`SessionError::Unreachable`].
pub(crate) async fn connect_upstream(
    target: &Target,
    ctx: &SessionContext,
) -> Result<tokio::net::TcpStream, SessionError> {
    target
        .connect(ctx.connect_timeout)
        .await
        .map_err(|source| SessionError::Unreachable { target: target.to_string(), source })
}
