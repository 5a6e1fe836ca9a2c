use anyhow::Context;
use std::path::Path;
use teamgrid_core::config::{ServerConfig, StorageKind};
use teamgrid_core::paths;

pub fn run(root: &Path, port: Option<u16>, storage: Option<StorageKind>) -> anyhow::Result<()> {
    println!("Initializing teamgrid in: {}", root.display());

    let dir = paths::teamgrid_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        let mut cfg = ServerConfig::default();
        if let Some(port) = port {
            cfg.port = port;
        }
        if let Some(storage) = storage {
            cfg.storage = storage;
        }
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    println!("\nStart the server with `teamgrid serve`.");
    Ok(())
}
