use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::proxy::connection::ConnectionCount;
use crate::proxy::handler::handle_client;
use crate::proxy::listener::{bind_listener, resolve_listen_addr};
use crate::proxy::session::SessionContext;

/// A bound proxy listener, ready to accept.
pub struct ProxyServer {
    listener: TcpListener,
    ctx: Arc<SessionContext>,
    connections: Arc<ConnectionCount>,
    drain_timeout: Duration,
}

impl ProxyServer {
    /// Resolve and bind the configured listen address.
    pub async fn bind(config: &Config) -> Result<Self> {
        let addr = resolve_listen_addr(&config.listen).await?;
        let listener = bind_listener(addr, config.timeout.bind_retry()).await?;
        Ok(Self::from_listener(listener, config))
    }

    /// Wrap an already bound listener.
    pub fn from_listener(listener: TcpListener, config: &Config) -> Self {
        Self {
            listener,
            ctx: Arc::new(SessionContext::from_config(config)),
            connections: Arc::new(ConnectionCount::default()),
            drain_timeout: config.timeout.shutdown(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept until `shutdown` turns `true`, then drain in-flight sessions.
    ///
    /// Sessions still running after the drain timeout are left to be dropped
    /// with the runtime.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let tracker = TaskTracker::new();
        let profile = self.ctx.profile;
        info!(
            addr = ?self.listener.local_addr().ok(),
            upload_kbps = profile.upload_kbps(),
            download_kbps = profile.download_kbps(),
            "proxy listening"
        );

        let mut signal_open = true;
        while !*shutdown.borrow() {
            let (client, peer) = tokio::select! {
                res = self.listener.accept() => match res {
                    Ok(pair) => pair,
                    Err(e) => {
                        let snapshot = self.connections.snapshot();
                        warn!(
                            error = %e,
                            current = snapshot.current,
                            total = snapshot.total,
                            errors = snapshot.errors,
                            "failed to accept connection"
                        );
                        continue;
                    }
                },
                res = shutdown.changed(), if signal_open => {
                    if res.is_err() {
                        // sender dropped; nobody can ask us to stop any more
                        signal_open = false;
                    }
                    continue;
                }
            };

            let ctx = self.ctx.clone();
            tracker.spawn(handle_client(client, peer, ctx, self.connections.clone()));
        }

        info!(in_flight = tracker.len(), "shutdown signal received, stopping accept loop");
        drop(self.listener);
        tracker.close();
        if timeout(self.drain_timeout, tracker.wait()).await.is_err() {
            warn!(
                remaining = tracker.len(),
                timeout = ?self.drain_timeout,
                "drain timed out, abandoning sessions"
            );
        } else {
            info!("all sessions drained");
        }
        Ok(())
    }
}

/// Bind from `config` and serve until `shutdown` turns `true`.
pub async fn run(config: Arc<Config>, shutdown: watch::Receiver<bool>) -> Result<()> {
    let server = ProxyServer::bind(&config).await?;
    server.serve(shutdown).await
}
