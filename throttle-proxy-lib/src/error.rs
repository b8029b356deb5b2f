use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can stop the proxy process
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resolve listen address: {0}")]
    Resolve(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
