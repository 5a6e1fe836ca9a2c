pub mod grid;
pub mod init;
pub mod project;
pub mod serve;
pub mod user;

use anyhow::Context;
use std::future::Future;
use std::path::Path;
use teamgrid_core::client::HttpGateway;
use teamgrid_core::config::ServerConfig;

/// Client for the server named by `--server`, or the one configured under `root`.
pub fn gateway(root: &Path, server: Option<&str>) -> anyhow::Result<HttpGateway> {
    let base_url = match server {
        Some(url) => url.to_string(),
        None => ServerConfig::load(root)
            .context("failed to load .teamgrid/config.yaml")?
            .base_url(),
    };
    Ok(HttpGateway::new(base_url))
}

/// Run one async command to completion on a fresh runtime.
pub fn block_on<F, T>(fut: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(fut)
}
