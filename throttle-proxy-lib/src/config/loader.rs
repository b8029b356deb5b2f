use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{ProxyError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| ProxyError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| ProxyError::Config(format!("Failed to parse config: {e}")))?;

    validate(&cfg)?;

    Ok(cfg)
}

/// Reject configurations the proxy cannot run with.
///
/// Zero and negative limits are accepted; they refuse the direction.
pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.listen.host.trim().is_empty() {
        return Err(ProxyError::Config("listen host cannot be empty".into()));
    }
    if !cfg.limits.upload_kbps.is_finite() {
        return Err(ProxyError::Config(format!(
            "upload_kbps must be a finite number, got {}",
            cfg.limits.upload_kbps
        )));
    }
    if !cfg.limits.download_kbps.is_finite() {
        return Err(ProxyError::Config(format!(
            "download_kbps must be a finite number, got {}",
            cfg.limits.download_kbps
        )));
    }
    if cfg.max_head_bytes == 0 {
        return Err(ProxyError::Config("max_head_bytes must be > 0".into()));
    }
    Ok(())
}
