//! Plain HTTP forwarding: route on the `Host:` header, replay the head,
//! then relay both directions.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::proxy::request::ParsedRequest;
use crate::proxy::response::{reject, BAD_GATEWAY, BAD_REQUEST};
use crate::proxy::session::{
    connect_upstream, run_relays, SessionContext, SessionError, SessionReport,
};
use crate::proxy::target::{Target, HTTP_DEFAULT_PORT};

/// Forward a non-CONNECT request to the origin named by its `Host:` header.
///
/// The captured head goes upstream verbatim (request line, headers, blank
/// line) outside the rate limit. Body bytes are not parsed: whatever the
/// client sends after the head, including bytes already buffered in
/// `client_reader`, rides the throttled upload direction.
pub async fn handle_forward<R, W>(
    client_reader: R,
    mut client_writer: W,
    request: &ParsedRequest,
    ctx: &SessionContext,
) -> Result<SessionReport, SessionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let Some(target) = request
        .host_header()
        .and_then(|host| Target::parse(&host, HTTP_DEFAULT_PORT))
    else {
        reject(&mut client_writer, BAD_REQUEST).await;
        return Err(SessionError::MissingHost);
    };

    let mut upstream = match connect_upstream(&target, ctx).await {
        Ok(stream) => stream,
        Err(e) => {
            reject(&mut client_writer, BAD_GATEWAY).await;
            return Err(e);
        }
    };

    if let Err(source) = upstream.write_all(request.head()).await {
        reject(&mut client_writer, BAD_GATEWAY).await;
        return Err(SessionError::Unreachable { target: target.to_string(), source });
    }
    debug!(%target, method = request.method(), "request head forwarded");

    let (upstream_reader, upstream_writer) = upstream.into_split();
    let report =
        run_relays(client_reader, client_writer, upstream_reader, upstream_writer, &ctx.profile)
            .await;
    Ok(report)
}
