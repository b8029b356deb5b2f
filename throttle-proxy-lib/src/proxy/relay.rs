//! One direction of a session: copy bytes from a source to a sink at the
//! pace a [`Limiter`] allows.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::throttle::{Direction, Limiter};

/// Largest single read from the source
pub const READ_BUFFER_SIZE: usize = 8 * 1024;

/// How a relay stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// Source reached end of stream
    Eof,
    /// Peer reset or aborted the connection
    Reset,
    /// The direction's limit is zero or negative
    Refused,
    /// Any other I/O failure; swallowed so it stays local to the connection
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub direction: Direction,
    /// Bytes written to the sink
    pub bytes: u64,
    pub end: RelayEnd,
}

/// Pump `source` into `sink` until either side stops.
///
/// Every read is flushed completely before the next one: the limiter is
/// asked how much of the unsent remainder is affordable, that much is written
/// and flushed, and the loop repeats. Never returns an error; the cause of
/// termination is in the report. Dropping the future (sibling direction
/// finished) is the only other way out.
pub async fn relay<R, W>(
    mut source: R,
    mut sink: W,
    mut limiter: Limiter,
    direction: Direction,
) -> RelayReport
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut bytes: u64 = 0;

    if limiter.is_refused() {
        debug!(%direction, "direction refused by zero limit, closing");
        let _ = sink.shutdown().await;
        return RelayReport { direction, bytes, end: RelayEnd::Refused };
    }

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => return RelayReport { direction, bytes, end: RelayEnd::Eof },
            Ok(n) => n,
            Err(e) => {
                let end = classify(&e);
                debug!(%direction, error = %e, bytes, "relay read ended");
                return RelayReport { direction, bytes, end };
            }
        };

        let mut offset = 0;
        while offset < n {
            let Some(allowed) = limiter.acquire(n - offset).await else {
                let _ = sink.shutdown().await;
                return RelayReport { direction, bytes, end: RelayEnd::Refused };
            };
            let end = offset.saturating_add(allowed).min(n);

            let written = match sink.write_all(&buf[offset..end]).await {
                Ok(()) => sink.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                let end = classify(&e);
                debug!(%direction, error = %e, bytes, "relay write ended");
                return RelayReport { direction, bytes, end };
            }

            bytes = bytes.saturating_add((end - offset) as u64);
            offset = end;
        }
    }
}

fn classify(error: &io::Error) -> RelayEnd {
    match error.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => RelayEnd::Reset,
        _ => RelayEnd::Failed,
    }
}
