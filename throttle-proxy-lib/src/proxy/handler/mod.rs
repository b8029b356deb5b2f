//! Entry point for one accepted client connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::debug;

use crate::proxy::connection::{ConnectionCount, ConnectionGuard};
use crate::proxy::forward::handle_forward;
use crate::proxy::request::read_request;
use crate::proxy::session::SessionContext;
use crate::proxy::tunnel::handle_connect;

/// Classify the request on `client` and hand it to the CONNECT or forward path.
///
/// Every failure stays inside this connection: it is logged, counted, and the
/// sockets are closed when the halves drop.
pub async fn handle_client(
    client: TcpStream,
    peer: SocketAddr,
    ctx: Arc<SessionContext>,
    connections: Arc<ConnectionCount>,
) {
    let _guard = ConnectionGuard::new(connections.clone());
    let _ = client.set_nodelay(true);

    let (read_half, write_half) = client.into_split();
    let mut reader = BufReader::new(read_half);

    let request = match read_request(&mut reader, ctx.max_head_bytes).await {
        Ok(request) => request,
        Err(e) => {
            connections.increment_errors();
            let snapshot = connections.snapshot();
            debug!(
                %peer,
                error = %e,
                current = snapshot.current,
                total = snapshot.total,
                errors = snapshot.errors,
                "dropping connection without a valid request"
            );
            return;
        }
    };
    debug!(%peer, method = request.method(), target = request.target(), "request classified");

    let result = if request.is_connect() {
        handle_connect(reader, write_half, &request, &ctx).await
    } else {
        handle_forward(reader, write_half, &request, &ctx).await
    };

    match result {
        Ok(report) => {
            let snapshot = connections.snapshot();
            debug!(
                %peer,
                target = request.target(),
                uploaded = report.uploaded(),
                downloaded = report.downloaded(),
                current = snapshot.current,
                total = snapshot.total,
                errors = snapshot.errors,
                "connection closed"
            );
        }
        Err(e) => {
            connections.increment_errors();
            let snapshot = connections.snapshot();
            debug!(
                %peer,
                target = request.target(),
                error = %e,
                current = snapshot.current,
                total = snapshot.total,
                errors = snapshot.errors,
                "connection failed"
            );
        }
    }
}
