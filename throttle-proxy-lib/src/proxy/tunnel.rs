//! CONNECT handling: reach the target, acknowledge, then relay opaque bytes.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::proxy::request::ParsedRequest;
use crate::proxy::response::{reject, send_status, BAD_GATEWAY, CONNECTION_ESTABLISHED};
use crate::proxy::session::{
    connect_upstream, run_relays, SessionContext, SessionError, SessionReport,
};
use crate::proxy::target::{Target, CONNECT_DEFAULT_PORT};

/// Establish a CONNECT tunnel for `request`.
///
/// The 200 is only sent once the target accepted the connection; otherwise
/// the client gets a single 502 and nothing else. Bytes the client sent after
/// its request head are already buffered in `client_reader` and become the
/// first bytes of the upload direction.
pub async fn handle_connect<R, W>(
    client_reader: R,
    mut client_writer: W,
    request: &ParsedRequest,
    ctx: &SessionContext,
) -> Result<SessionReport, SessionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let connected = match Target::parse(request.target(), CONNECT_DEFAULT_PORT) {
        Some(target) => connect_upstream(&target, ctx).await.map(|s| (target, s)),
        None => Err(SessionError::Unreachable {
            target: request.target().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty host"),
        }),
    };
    let (target, upstream) = match connected {
        Ok(pair) => pair,
        Err(e) => {
            reject(&mut client_writer, BAD_GATEWAY).await;
            return Err(e);
        }
    };

    send_status(&mut client_writer, CONNECTION_ESTABLISHED)
        .await
        .map_err(SessionError::Client)?;
    debug!(%target, "tunnel established");

    let (upstream_reader, upstream_writer) = upstream.into_split();
    let report =
        run_relays(client_reader, client_writer, upstream_reader, upstream_writer, &ctx.profile)
            .await;
    Ok(report)
}
