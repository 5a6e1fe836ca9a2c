use anyhow::Context;
use std::path::Path;
use teamgrid_core::config::ServerConfig;
use teamgrid_server::AppState;

pub fn run(root: &Path, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(root).context("failed to load .teamgrid/config.yaml")?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    super::block_on(async move {
        let state = AppState::open(root, &config)?;
        let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
        let addr = listener.local_addr()?;
        println!("teamgrid server on http://{addr}  (storage: {:?})", config.storage);

        teamgrid_server::serve_on(state, listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    })
}
