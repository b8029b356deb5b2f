//! Shared helpers for the loopback proxy tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use throttle_proxy_lib::config::Config;
use throttle_proxy_lib::ProxyServer;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Config listening on an ephemeral loopback port with the given limits
pub fn test_config(upload_kbps: f64, download_kbps: f64) -> Config {
    let mut cfg = Config::default();
    cfg.listen.port = 0;
    cfg.limits.upload_kbps = upload_kbps;
    cfg.limits.download_kbps = download_kbps;
    cfg.timeout.connect_ms = 2_000;
    cfg.timeout.shutdown_secs = 2;
    cfg
}

pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: watch::Sender<bool>,
    pub handle: JoinHandle<throttle_proxy_lib::Result<()>>,
}

/// Bind a proxy on 127.0.0.1:0 and serve it in the background
pub async fn start_proxy(config: Config) -> TestResult<RunningProxy> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = ProxyServer::from_listener(listener, &config);
    let addr = server.local_addr()?;
    let (shutdown, rx) = watch::channel(false);
    let handle = tokio::spawn(server.serve(rx));
    Ok(RunningProxy { addr, shutdown, handle })
}

/// A local port nothing listens on
pub async fn unused_addr() -> TestResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Echo every byte back until the peer closes
pub async fn spawn_echo_server() -> TestResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        loop {
            let Ok((mut s, _)) = listener.accept().await else {
                continue;
            };
            tokio::spawn(async move {
                let (mut r, mut w) = s.split();
                let _ = tokio::io::copy(&mut r, &mut w).await;
            });
        }
    });
    Ok(addr)
}

/// Accept one connection, read until `expected` bytes (or EOF) and report
/// how many arrived and when the last one did.
pub async fn spawn_counting_server(
    expected: usize,
) -> TestResult<(SocketAddr, oneshot::Receiver<(usize, Instant)>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let Ok((mut s, _)) = listener.accept().await else {
            return;
        };
        let mut buf = vec![0u8; 4096];
        let mut total = 0usize;
        while total < expected {
            match s.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => total += n,
            }
        }
        let _ = tx.send((total, Instant::now()));
    });
    Ok((addr, rx))
}

/// Count accepted connections, closing each immediately
pub async fn spawn_closing_server() -> TestResult<(SocketAddr, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((s, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(s);
        }
    });
    Ok((addr, accepted))
}

/// Read exactly `len` bytes
pub async fn read_exact_vec<R: AsyncRead + Unpin>(
    reader: &mut R,
    len: usize,
) -> TestResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    timeout(Duration::from_secs(5), reader.read_exact(&mut buf)).await??;
    Ok(buf)
}

/// Read everything until the peer closes; a reset counts as closing
/// (the proxy may drop a socket with unread client bytes in it)
pub async fn read_to_close(stream: &mut TcpStream) -> TestResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, stream.read(&mut chunk)).await? {
            Ok(0) => return Ok(buf),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return Ok(buf),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Open a CONNECT tunnel through the proxy and consume the 200
pub async fn open_tunnel(proxy: SocketAddr, target: SocketAddr) -> TestResult<TcpStream> {
    let mut client = TcpStream::connect(proxy).await?;
    client
        .write_all(format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n\r\n").as_bytes())
        .await?;
    let expected = b"HTTP/1.1 200 Connection established\r\n\r\n";
    let status = read_exact_vec(&mut client, expected.len()).await?;
    if status != expected {
        let reply = String::from_utf8_lossy(&status);
        return Err(format!("unexpected tunnel reply: {reply:?}").into());
    }
    Ok(client)
}
