#![forbid(unsafe_code)]

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use throttle_proxy_lib::config::{load_from_path, validate, Config};
use throttle_proxy_lib::{proxy, telemetry};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bandwidth-limiting HTTP(S) forward proxy (CONNECT tunneling)",
    long_about = "Point a browser at this proxy to reproduce a slow link. \
                  Upload is client->server, download is server->client; \
                  a limit of 0 or less refuses that direction."
)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "THROTTLE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind the proxy on [default: 127.0.0.1]
    #[arg(long, env = "THROTTLE_PROXY_HOST")]
    host: Option<String>,

    /// Port to bind the proxy on [default: 8888]
    #[arg(short, long, env = "THROTTLE_PROXY_PORT")]
    port: Option<u16>,

    /// Upload limit in kbps, client -> server [default: 1000]
    #[arg(long, value_name = "KBPS", env = "THROTTLE_PROXY_UP", allow_negative_numbers = true)]
    up: Option<f64>,

    /// Download limit in kbps, server -> client [default: 1000]
    #[arg(long, value_name = "KBPS", env = "THROTTLE_PROXY_DOWN", allow_negative_numbers = true)]
    down: Option<f64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "THROTTLE_PROXY_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// File values (or defaults), overridden by whatever was given on the command line.
    fn into_config(self) -> throttle_proxy_lib::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => load_from_path(path)?,
            None => Config::default(),
        };
        if let Some(host) = self.host {
            cfg.listen.host = host;
        }
        if let Some(port) = self.port {
            cfg.listen.port = port;
        }
        if let Some(up) = self.up {
            cfg.limits.upload_kbps = up;
        }
        if let Some(down) = self.down {
            cfg.limits.download_kbps = down;
        }
        if let Some(level) = self.log_level {
            cfg.logging.level = level;
        }
        validate(&cfg)?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = telemetry::init_tracing(&cfg.logging.level, cfg.logging.show_target) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    info!(
        listen = %cfg.listen.authority(),
        upload_kbps = cfg.limits.upload_kbps,
        download_kbps = cfg.limits.download_kbps,
        "starting proxy"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    if let Err(err) = proxy::run(Arc::new(cfg), shutdown_rx).await {
        error!(%err, "proxy exited with error");
        std::process::exit(1);
    }
    info!("proxy shut down");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, only Ctrl-C will stop the proxy");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, initiating graceful shutdown"),
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, initiating graceful shutdown"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl-C, initiating graceful shutdown");
    }
}
