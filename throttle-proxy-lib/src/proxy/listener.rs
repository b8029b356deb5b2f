use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::net::{lookup_host, TcpListener};
use tokio::time::sleep;
use tracing::warn;

use crate::config::ListenConfig;
use crate::error::{ProxyError, Result};

const LISTEN_BACKLOG: i32 = 1024;

/// Resolve the configured listen host to a socket address (first result wins).
pub async fn resolve_listen_addr(listen: &ListenConfig) -> Result<SocketAddr> {
    let authority = listen.authority();
    let mut addrs = lookup_host(authority.as_str())
        .await
        .map_err(|e| ProxyError::Resolve(format!("{authority}: {e}")))?;
    addrs
        .next()
        .ok_or_else(|| ProxyError::Resolve(format!("{authority}: no addresses")))
}

/// Bind a listening socket with `SO_REUSEADDR` set on unix.
pub fn new_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    #[cfg(unix)]
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(LISTEN_BACKLOG)?;
    TcpListener::from_std(socket.into())
}

/// Bind `addr`, retrying exactly once after `retry_delay` if the port is taken.
pub async fn bind_listener(addr: SocketAddr, retry_delay: Duration) -> Result<TcpListener> {
    match new_listener(addr) {
        Ok(listener) => return Ok(listener),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            warn!(%addr, retry_in = ?retry_delay, "port already in use, retrying once");
        }
        Err(source) => return Err(ProxyError::Bind { addr, source }),
    }

    sleep(retry_delay).await;
    new_listener(addr).map_err(|source| ProxyError::Bind { addr, source })
}
