use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Sent once the CONNECT target is reachable; the tunnel starts right after.
pub const CONNECTION_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection established\r\n\r\n";

/// Plain request without a usable `Host:` header.
pub const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\n\r\n";

/// Upstream could not be reached.
pub const BAD_GATEWAY: &[u8] = b"HTTP/1.1 502 Bad Gateway\r\n\r\n";

/// Write a synthesized status line (no body) and flush it.
pub async fn send_status<W>(writer: &mut W, status: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(status).await?;
    writer.flush().await
}

/// Best-effort error response followed by closing the write side.
pub async fn reject<W>(writer: &mut W, status: &[u8])
where
    W: AsyncWrite + Unpin,
{
    let _ = send_status(writer, status).await;
    let _ = writer.shutdown().await;
}
